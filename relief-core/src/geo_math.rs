//! Great-circle helpers shared by the search and routing pipelines.
//!
//! Distances use the haversine formula on a spherical Earth with a mean
//! radius of 6,371 km. The functions are pure and allocation-free except for
//! [`sort_by_distance`], which returns a new vector.

use geo::{Coord, Intersects, Rect};

use crate::{Coordinate, PointOfInterest};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Metres spanned by one degree of latitude on the reference sphere.
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;

/// Haversine distance between `a` and `b` in metres.
///
/// # Examples
/// ```
/// use relief_core::{Coordinate, geo_math::distance};
///
/// let a = Coordinate::try_new(31.2304, 121.4737)?;
/// assert_eq!(distance(a, a), 0.0);
/// # Ok::<(), relief_core::CoordinateError>(())
/// ```
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude().to_radians();
    let lat_b = b.latitude().to_radians();
    // Absolute deltas keep the result bit-for-bit symmetric.
    let d_lat = (b.latitude() - a.latitude()).abs().to_radians();
    let d_lon = (b.longitude() - a.longitude()).abs().to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push `h` marginally above one for antipodal points.
    2.0 * EARTH_RADIUS_METERS * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Whether `point` lies within `radius_meters` of `center` (inclusive).
#[must_use]
pub fn within_radius(center: Coordinate, point: Coordinate, radius_meters: f64) -> bool {
    distance(center, point) <= radius_meters
}

/// Return `points` ordered by ascending distance from `center`.
///
/// The sort is stable: equidistant points keep their input order.
#[must_use]
pub fn sort_by_distance(points: &[PointOfInterest], center: Coordinate) -> Vec<PointOfInterest> {
    let mut keyed: Vec<(f64, &PointOfInterest)> = points
        .iter()
        .map(|poi| (distance(center, poi.coordinate), poi))
        .collect();
    keyed.sort_by(|(lhs, _), (rhs, _)| lhs.total_cmp(rhs));
    keyed.into_iter().map(|(_, poi)| poi.clone()).collect()
}

/// Longitude/latitude boxes that together enclose the circle around `center`.
///
/// The boxes are conservative: every point within `radius_meters` lies inside
/// one of them, but the corners do not. A circle that crosses the
/// antimeridian is split into two boxes, one on each side of ±180°. Near the
/// poles the longitude span widens to the full range.
#[must_use]
pub fn bounding_box(center: Coordinate, radius_meters: f64) -> Vec<Rect<f64>> {
    let d_lat = radius_meters / METERS_PER_DEGREE;
    let cos_lat = center.latitude().to_radians().cos();
    let d_lon = if cos_lat <= f64::EPSILON {
        180.0
    } else {
        (radius_meters / (METERS_PER_DEGREE * cos_lat)).min(180.0)
    };
    let south = (center.latitude() - d_lat).max(-90.0);
    let north = (center.latitude() + d_lat).min(90.0);
    let span = |west: f64, east: f64| {
        Rect::new(Coord { x: west, y: south }, Coord { x: east, y: north })
    };

    let west = center.longitude() - d_lon;
    let east = center.longitude() + d_lon;
    if d_lon >= 180.0 {
        vec![span(-180.0, 180.0)]
    } else if west < -180.0 {
        vec![span(west + 360.0, 180.0), span(-180.0, east)]
    } else if east > 180.0 {
        vec![span(west, 180.0), span(-180.0, east - 360.0)]
    } else {
        vec![span(west, east)]
    }
}

/// Whether `point` falls inside any of `boxes` (edges inclusive).
#[must_use]
pub fn in_bounding_box(boxes: &[Rect<f64>], point: Coord<f64>) -> bool {
    boxes.iter().any(|rect| rect.intersects(&point))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::try_new(latitude, longitude).expect("valid coordinate")
    }

    fn poi(id: &str, latitude: f64, longitude: f64) -> PointOfInterest {
        PointOfInterest::new(id, id, "", coord(latitude, longitude))
    }

    #[rstest]
    fn identical_points_are_zero_apart() {
        let a = coord(31.2304, 121.4737);
        assert_eq!(distance(a, a), 0.0);
    }

    #[rstest]
    fn antipodal_points_are_half_a_circumference_apart() {
        let d = distance(coord(0.0, 0.0), coord(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((d - expected).abs() < 1.0e-6, "got {d}, expected {expected}");

        let poles = distance(coord(90.0, 0.0), coord(-90.0, 0.0));
        assert!(poles.is_finite());
        assert!((poles - expected).abs() < 1.0e-6);
    }

    #[rstest]
    fn people_square_seed_is_about_190_metres_away() {
        let d = distance(coord(31.2304, 121.4737), coord(31.2317, 121.4750));
        assert!((d - 190.19).abs() < 0.5, "got {d}");
    }

    #[rstest]
    #[case(100.0, false)]
    #[case(190.0, false)]
    #[case(191.0, true)]
    #[case(1500.0, true)]
    fn radius_membership_is_inclusive(#[case] radius: f64, #[case] expected: bool) {
        let center = coord(31.2304, 121.4737);
        assert_eq!(within_radius(center, coord(31.2317, 121.4750), radius), expected);
        assert!(within_radius(center, center, 0.0));
    }

    #[rstest]
    fn sort_orders_by_distance_and_keeps_ties_stable() {
        let center = coord(0.0, 0.0);
        let points = vec![
            poi("far", 0.0, 0.02),
            poi("east", 0.0, 0.01),
            poi("west", 0.0, -0.01),
            poi("here", 0.0, 0.0),
        ];

        let sorted = sort_by_distance(&points, center);
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, ["here", "east", "west", "far"]);
    }

    #[rstest]
    #[case(31.2304, 121.4737, 1500.0)]
    #[case(59.9, 10.7, 3000.0)]
    #[case(-33.9, 151.2, 50.0)]
    fn bounding_box_contains_points_on_the_circle(
        #[case] latitude: f64,
        #[case] longitude: f64,
        #[case] radius: f64,
    ) {
        let center = coord(latitude, longitude);
        let boxes = bounding_box(center, radius);
        let north = coord(latitude + radius / METERS_PER_DEGREE * 0.999, longitude);
        let d_lon = radius / (METERS_PER_DEGREE * latitude.to_radians().cos()) * 0.999;
        let east = coord(latitude, longitude + d_lon);
        assert_eq!(boxes.len(), 1);
        assert!(in_bounding_box(&boxes, Coord::from(north)));
        assert!(in_bounding_box(&boxes, Coord::from(east)));
        assert!(within_radius(center, east, radius));
    }

    #[rstest]
    #[case(179.999, -179.999)]
    #[case(-179.999, 179.999)]
    fn bounding_box_wraps_across_the_antimeridian(
        #[case] center_lon: f64,
        #[case] point_lon: f64,
    ) {
        let center = coord(0.0, center_lon);
        let point = coord(0.0, point_lon);
        let boxes = bounding_box(center, 1000.0);

        assert!(within_radius(center, point, 1000.0));
        assert_eq!(boxes.len(), 2);
        assert!(in_bounding_box(&boxes, Coord::from(point)));
        assert!(in_bounding_box(&boxes, Coord::from(center)));
        assert!(!in_bounding_box(&boxes, Coord::from(coord(0.0, 0.0))));
    }

    #[rstest]
    fn polar_bounding_box_spans_every_longitude() {
        let boxes = bounding_box(coord(90.0, 10.0), 500.0);
        assert_eq!(boxes.len(), 1);
        assert!(in_bounding_box(&boxes, Coord::from(coord(89.999, -170.0))));
    }

    fn any_coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| coord(lat, lon))
    }

    proptest! {
        #[test]
        fn distance_to_self_is_zero(a in any_coordinate()) {
            prop_assert_eq!(distance(a, a), 0.0);
        }

        #[test]
        fn distance_is_symmetric(a in any_coordinate(), b in any_coordinate()) {
            prop_assert_eq!(distance(a, b), distance(b, a));
        }

        #[test]
        fn distance_is_bounded_by_half_circumference(a in any_coordinate(), b in any_coordinate()) {
            let d = distance(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_METERS + 1.0e-6);
        }
    }
}
