//! Built-in restroom dataset used as the last search resort.

use async_trait::async_trait;
use geo::Coord;

use super::{SearchQuery, SearchStrategy, StrategyKind};
use crate::{ProviderError, RawPoi, geo_math};

struct SeedRecord {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    lat: f64,
    lon: f64,
}

const BUILTIN_RESTROOMS: &[SeedRecord] = &[
    SeedRecord {
        id: "seed-renmin-square-east",
        name: "People's Square East Public Toilet",
        address: "120 Renmin Avenue, Huangpu",
        lat: 31.2317, lon: 121.4750,
    },
    SeedRecord {
        id: "seed-renmin-park",
        name: "People's Park Gate 2 Restroom",
        address: "231 West Nanjing Road, Huangpu",
        lat: 31.2336, lon: 121.4712,
    },
    SeedRecord {
        id: "seed-shanghai-museum",
        name: "Shanghai Museum Visitor Restroom",
        address: "201 Renmin Avenue, Huangpu",
        lat: 31.2284, lon: 121.4755,
    },
    SeedRecord {
        id: "seed-nanjing-east-metro",
        name: "East Nanjing Road Metro Exit 3 Toilet",
        address: "East Nanjing Road & Central Henan Road, Huangpu",
        lat: 31.2378, lon: 121.4846,
    },
    SeedRecord {
        id: "seed-huanghe-road",
        name: "Huanghe Road Public Toilet",
        address: "65 Huanghe Road, Huangpu",
        lat: 31.2352, lon: 121.4689,
    },
    SeedRecord {
        id: "seed-xizang-middle",
        name: "Xizang Middle Road Public Toilet",
        address: "Xizang Middle Road & Jiujiang Road, Huangpu",
        lat: 31.2349, lon: 121.4781,
    },
    SeedRecord {
        id: "seed-dashijie",
        name: "Great World Square Restroom",
        address: "1 Xizang South Road, Huangpu",
        lat: 31.2290, lon: 121.4809,
    },
    SeedRecord {
        id: "seed-bund-chenyi",
        name: "Chen Yi Square Public Toilet",
        address: "Zhongshan East 1st Road, Huangpu",
        lat: 31.2400, lon: 121.4900,
    },
    SeedRecord {
        id: "seed-jingan-temple",
        name: "Jing'an Temple Plaza Restroom",
        address: "1686 West Nanjing Road, Jing'an",
        lat: 31.2236, lon: 121.4457,
    },
    SeedRecord {
        id: "seed-xintiandi",
        name: "Xintiandi North Block Restroom",
        address: "181 Taicang Road, Huangpu",
        lat: 31.2196, lon: 121.4750,
    },
];

/// Static, always-available [`SearchStrategy`].
///
/// The store performs a linear scan behind a bounding-box pre-filter and is
/// intended only for the small bundled dataset or test fixtures. It never
/// fails, which makes it the guaranteed last entry of a strategy chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSearchStrategy {
    records: Vec<RawPoi>,
}

impl SeedSearchStrategy {
    /// Strategy over the bundled central-Shanghai dataset.
    #[must_use]
    pub fn builtin() -> Self {
        Self::with_records(
            BUILTIN_RESTROOMS
                .iter()
                .map(|r| RawPoi::new(r.id, r.name, r.address, r.lat, r.lon)),
        )
    }

    /// Strategy over caller-supplied records.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RawPoi>,
    {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Number of bundled records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the strategy holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for SeedSearchStrategy {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait]
impl SearchStrategy for SeedSearchStrategy {
    fn name(&self) -> &str {
        "seed"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Local
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPoi>, ProviderError> {
        let boxes = geo_math::bounding_box(query.center(), query.radius_meters());
        Ok(self
            .records
            .iter()
            .filter(|r| {
                geo_math::in_bounding_box(
                    &boxes,
                    Coord {
                        x: r.longitude,
                        y: r.latitude,
                    },
                )
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;
    use rstest::rstest;

    fn query(radius: f64) -> SearchQuery {
        let center = Coordinate::try_new(31.2304, 121.4737).expect("valid coordinate");
        SearchQuery::new(center, radius, 20).expect("valid query")
    }

    #[rstest]
    fn builtin_dataset_is_valid() {
        let seed = SeedSearchStrategy::builtin();
        assert!(!seed.is_empty());
        assert!(seed.records.iter().all(|r| r.clone().into_poi().is_some()));
    }

    #[rstest]
    #[tokio::test]
    async fn prefilter_excludes_distant_records() {
        let seed = SeedSearchStrategy::builtin();
        let near = seed.fetch(&query(300.0)).await.expect("seed never fails");
        let ids: Vec<&str> = near.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"seed-renmin-square-east"));
        assert!(!ids.contains(&"seed-jingan-temple"));
    }

    #[rstest]
    #[tokio::test]
    async fn records_across_the_antimeridian_survive_the_prefilter() {
        let seed = SeedSearchStrategy::with_records([RawPoi::new(
            "dateline",
            "Dateline Toilet",
            "",
            0.0,
            -179.999,
        )]);
        let center = Coordinate::try_new(0.0, 179.999).expect("valid coordinate");
        let query = SearchQuery::new(center, 1000.0, 20).expect("valid query");

        let records = seed.fetch(&query).await.expect("seed never fails");

        assert_eq!(records.len(), 1);
    }

    #[rstest]
    fn is_local() {
        let seed = SeedSearchStrategy::builtin();
        assert_eq!(seed.kind(), StrategyKind::Local);
        assert_eq!(seed.name(), "seed");
    }
}
