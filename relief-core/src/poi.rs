use crate::Coordinate;

/// A restroom (or other facility) the user may be sent to.
///
/// `distance_meters` is populated by the search aggregator relative to the
/// query centre. It is only `None` for values built outside a search.
///
/// # Examples
/// ```
/// use relief_core::{Coordinate, PointOfInterest};
///
/// let poi = PointOfInterest::new(
///     "seed-1",
///     "People's Square WC",
///     "120 Renmin Avenue",
///     Coordinate::try_new(31.2317, 121.4750)?,
/// );
///
/// assert_eq!(poi.id, "seed-1");
/// assert!(poi.distance_meters.is_none());
/// # Ok::<(), relief_core::CoordinateError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointOfInterest {
    /// Provider identifier, unique within one result set.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Human-readable address, possibly empty.
    pub address: String,
    /// Validated position.
    pub coordinate: Coordinate,
    /// Great-circle distance from the query centre, rounded to whole metres.
    pub distance_meters: Option<f64>,
}

impl PointOfInterest {
    /// Construct a point of interest without a computed distance.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            coordinate,
            distance_meters: None,
        }
    }

    /// Return a copy carrying the supplied distance.
    #[must_use]
    pub fn with_distance(mut self, distance_meters: f64) -> Self {
        self.distance_meters = Some(distance_meters);
        self
    }
}

/// A provider record before normalisation.
///
/// Search adapters map their provider-specific payloads into this shape.
/// Coordinates are deliberately unchecked so that one malformed record can
/// be dropped without discarding the rest of the response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoi {
    /// Provider identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Address text assembled by the adapter.
    pub address: String,
    /// Latitude in degrees, possibly malformed.
    pub latitude: f64,
    /// Longitude in degrees, possibly malformed.
    pub longitude: f64,
}

impl RawPoi {
    /// Construct a raw record.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            latitude,
            longitude,
        }
    }

    /// Validate the coordinates and promote the record.
    ///
    /// Returns `None` when the coordinates are non-finite or out of range.
    #[must_use]
    pub fn into_poi(self) -> Option<PointOfInterest> {
        let coordinate = Coordinate::try_new(self.latitude, self.longitude).ok()?;
        Some(PointOfInterest::new(
            self.id,
            self.name,
            self.address,
            coordinate,
        ))
    }
}
