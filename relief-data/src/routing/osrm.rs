//! OSRM API response types for the Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
///
/// The response contains routes on success or an error message on failure.
/// The `code` field indicates the response status.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// One route between the requested coordinates.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Total distance in metres.
    pub distance: f64,
    /// Total duration in seconds.
    pub duration: f64,
    /// One leg per consecutive coordinate pair.
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// Part of a route between two waypoints.
#[derive(Debug, Deserialize)]
pub struct Leg {
    /// Turn-by-turn steps; empty unless `steps=true` was requested.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A single manoeuvre.
#[derive(Debug, Deserialize)]
pub struct Step {
    /// Step length in metres.
    pub distance: f64,
    /// Step duration in seconds.
    pub duration: f64,
    /// Name of the way travelled.
    #[serde(default)]
    pub name: String,
    /// The manoeuvre at the start of the step.
    pub maneuver: Maneuver,
}

/// Manoeuvre type and direction.
#[derive(Debug, Deserialize)]
pub struct Maneuver {
    /// Manoeuvre kind, for example `"turn"` or `"depart"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Direction qualifier, for example `"left"`.
    pub modifier: Option<String>,
}
