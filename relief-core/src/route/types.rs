use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Coordinate;

/// How the user will travel to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TravelMode {
    /// On foot.
    #[default]
    Walking,
    /// By bicycle.
    Cycling,
}

/// Assumed walking speed, 5 km/h.
pub const WALKING_SPEED_MPS: f64 = 1.39;

/// Assumed cycling speed, 15 km/h.
pub const CYCLING_SPEED_MPS: f64 = 4.17;

impl TravelMode {
    /// Constant speed used for analytic estimates, in metres per second.
    #[must_use]
    pub const fn speed_mps(self) -> f64 {
        match self {
            Self::Walking => WALKING_SPEED_MPS,
            Self::Cycling => CYCLING_SPEED_MPS,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Cycling => "cycling",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`TravelMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode {0:?} (expected walking or cycling)")]
pub struct ParseTravelModeError(pub String);

impl FromStr for TravelMode {
    type Err = ParseTravelModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walking" | "walk" | "foot" => Ok(Self::Walking),
            "cycling" | "bike" | "bicycle" | "riding" => Ok(Self::Cycling),
            _ => Err(ParseTravelModeError(s.to_owned())),
        }
    }
}

/// Parameters for a single origin/destination estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    /// Start of the trip.
    pub origin: Coordinate,
    /// End of the trip.
    pub destination: Coordinate,
    /// Travel mode.
    pub mode: TravelMode,
    /// Optional time budget carried alongside the query.
    pub time_limit_minutes: Option<f64>,
}

impl RouteQuery {
    /// Construct a query without a time budget.
    #[must_use]
    pub const fn new(origin: Coordinate, destination: Coordinate, mode: TravelMode) -> Self {
        Self {
            origin,
            destination,
            mode,
            time_limit_minutes: None,
        }
    }

    /// Attach a time budget.
    #[must_use]
    pub const fn with_time_limit(mut self, minutes: f64) -> Self {
        self.time_limit_minutes = Some(minutes);
        self
    }
}

/// Provenance of a [`RouteEstimate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EstimateSource {
    /// Computed by a live routing service.
    Live,
    /// Derived from straight-line distance and a constant speed.
    Estimated,
}

/// Distance and duration for one trip, tagged with where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteEstimate {
    /// Trip length in metres.
    pub distance_meters: f64,
    /// Trip duration in seconds.
    pub duration_seconds: f64,
    /// Whether the figures are live or analytic.
    pub source: EstimateSource,
}

impl RouteEstimate {
    /// Duration expressed in minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }
}
