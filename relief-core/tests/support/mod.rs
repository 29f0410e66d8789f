//! Shared helpers for behaviour tests.

#![allow(dead_code, reason = "each behaviour suite uses a subset of the helpers")]

use std::future::Future;

use relief_core::{Coordinate, PointOfInterest, RawPoi};

/// Latitude and longitude of the user in every scenario.
pub const ORIGIN: (f64, f64) = (31.2304, 121.4737);

/// Drive `future` to completion on a fresh current-thread runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime")
        .block_on(future)
}

/// The scenario origin as a validated coordinate.
pub fn origin() -> Coordinate {
    Coordinate::try_new(ORIGIN.0, ORIGIN.1).expect("origin is valid")
}

/// Three raw restrooms at roughly 130 m, 190 m and 790 m from [`ORIGIN`],
/// listed out of order.
pub fn three_nearby() -> Vec<RawPoi> {
    vec![
        RawPoi::new("far", "Far", "", 31.2350, 121.4800),
        RawPoi::new("near", "Near", "", 31.2312, 121.4747),
        RawPoi::new("mid", "Mid", "", 31.2317, 121.4750),
    ]
}

/// A validated point of interest named after its id.
pub fn poi(id: &str, latitude: f64, longitude: f64) -> PointOfInterest {
    let coordinate = Coordinate::try_new(latitude, longitude).expect("valid coordinate");
    PointOfInterest::new(id, id, "", coordinate)
}
