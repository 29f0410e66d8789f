//! Search request parameters.

use thiserror::Error;

use crate::Coordinate;

/// Smallest radius forwarded to remote providers.
pub const MIN_PROVIDER_RADIUS_METERS: f64 = 50.0;

/// Largest radius forwarded to remote providers.
pub const MAX_PROVIDER_RADIUS_METERS: f64 = 3_000.0;

/// A centre/radius/limit search request.
///
/// # Examples
/// ```
/// use relief_core::{Coordinate, SearchQuery};
///
/// let center = Coordinate::try_new(31.2304, 121.4737)?;
/// let query = SearchQuery::new(center, 10_000.0, 5)?;
///
/// assert_eq!(query.radius_meters(), 10_000.0);
/// assert_eq!(query.provider_radius_meters(), 3_000.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchQuery {
    center: Coordinate,
    radius_meters: f64,
    result_limit: usize,
}

/// Errors returned by [`SearchQuery::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SearchQueryError {
    /// The radius was zero, negative or not finite.
    #[error("search radius must be a positive number of metres (got {0})")]
    InvalidRadius(f64),
    /// The result limit was zero.
    #[error("result limit must be at least one")]
    ZeroLimit,
}

impl SearchQuery {
    /// Validate and construct a query.
    pub fn new(
        center: Coordinate,
        radius_meters: f64,
        result_limit: usize,
    ) -> Result<Self, SearchQueryError> {
        if !radius_meters.is_finite() || radius_meters <= 0.0 {
            return Err(SearchQueryError::InvalidRadius(radius_meters));
        }
        if result_limit == 0 {
            return Err(SearchQueryError::ZeroLimit);
        }
        Ok(Self {
            center,
            radius_meters,
            result_limit,
        })
    }

    /// Search centre.
    #[must_use]
    pub const fn center(&self) -> Coordinate {
        self.center
    }

    /// Caller-supplied radius used for the final membership check.
    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Maximum number of results returned.
    #[must_use]
    pub const fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// Radius clamped to the band remote providers are queried with.
    #[must_use]
    pub fn provider_radius_meters(&self) -> f64 {
        self.radius_meters
            .clamp(MIN_PROVIDER_RADIUS_METERS, MAX_PROVIDER_RADIUS_METERS)
    }

    /// Copy of this query carrying the clamped provider radius.
    #[must_use]
    pub(crate) fn for_remote_provider(&self) -> Self {
        Self {
            radius_meters: self.provider_radius_meters(),
            ..*self
        }
    }
}
