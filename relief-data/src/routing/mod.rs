//! Live routing adapters.
//!
//! [`HttpRoutingService`] implements [`relief_core::RoutingService`] against
//! an OSRM server's Route API. Pair it with
//! [`RouteEstimator::with_service`](relief_core::RouteEstimator::with_service);
//! the estimator applies its own timeout and falls back to an analytic
//! estimate on any failure.

mod osrm;
mod provider;

pub use provider::{HttpRoutingService, HttpRoutingServiceConfig};
