//! Deep-link construction for known mapping applications.
//!
//! Each engine contributes one or more URI variants because the same app
//! registers different schemes per platform. Parameters are percent-encoded
//! through [`url::Url`], which keeps display names with spaces or CJK text
//! intact.

use std::fmt;

use log::warn;
use url::Url;

use super::LinkCandidate;
use crate::{PointOfInterest, TravelMode};

/// Engine identifier used for the generic `geo:` link.
pub const GENERIC_ENGINE: &str = "geo";

/// Engine identifier used for the browser fallback link.
pub const WEB_ENGINE: &str = "web";

/// Application name reported to engines that ask for a caller.
const SOURCE_APPLICATION: &str = "relief";

/// External mapping applications with known deep-link formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEngine {
    /// AMap (Gaode).
    Amap,
    /// Baidu Maps.
    Baidu,
    /// Tencent Maps.
    Tencent,
    /// Apple Maps.
    Apple,
    /// Google Maps.
    Google,
}

impl MapEngine {
    /// Every engine in registry order.
    pub const ALL: [Self; 5] = [
        Self::Amap,
        Self::Baidu,
        Self::Tencent,
        Self::Apple,
        Self::Google,
    ];

    /// Stable identifier stored in settings and logs.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Amap => "amap",
            Self::Baidu => "baidu",
            Self::Tencent => "tencent",
            Self::Apple => "apple",
            Self::Google => "google",
        }
    }

    /// Resolve an identifier or common alias, case-insensitively.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "amap" | "gaode" | "autonavi" => Some(Self::Amap),
            "baidu" | "baidumap" => Some(Self::Baidu),
            "tencent" | "qqmap" | "qq" => Some(Self::Tencent),
            "apple" | "applemaps" => Some(Self::Apple),
            "google" | "googlemaps" => Some(Self::Google),
            _ => None,
        }
    }

    const fn serves_mainland_china(self) -> bool {
        matches!(self, Self::Amap | Self::Baidu | Self::Tencent)
    }

    fn deep_links(self, target: &Target<'_>) -> Vec<Option<String>> {
        let walking = target.mode == TravelMode::Walking;
        match self {
            Self::Amap => {
                let t = if walking { "2" } else { "3" };
                let params = [
                    ("sourceApplication", SOURCE_APPLICATION),
                    ("dlat", target.lat.as_str()),
                    ("dlon", target.lon.as_str()),
                    ("dname", target.name),
                    ("dev", "0"),
                    ("t", t),
                ];
                vec![
                    with_query("amapuri://route/plan/", &params),
                    with_query("iosamap://path", &params),
                    with_query("androidamap://route/plan/", &params),
                ]
            }
            Self::Baidu => {
                let destination = format!("latlng:{},{}|name:{}", target.lat, target.lon, target.name);
                let mode = if walking { "walking" } else { "riding" };
                vec![with_query(
                    "baidumap://map/direction",
                    &[
                        ("destination", destination.as_str()),
                        ("coord_type", "gcj02"),
                        ("mode", mode),
                        ("src", SOURCE_APPLICATION),
                    ],
                )]
            }
            Self::Tencent => {
                let tocoord = target.pair();
                let kind = if walking { "walk" } else { "bike" };
                vec![with_query(
                    "qqmap://map/routeplan",
                    &[
                        ("type", kind),
                        ("tocoord", tocoord.as_str()),
                        ("to", target.name),
                        ("referer", SOURCE_APPLICATION),
                    ],
                )]
            }
            Self::Apple => {
                let daddr = target.pair();
                let flag = if walking { "w" } else { "c" };
                vec![with_query(
                    "maps://",
                    &[("daddr", daddr.as_str()), ("dirflg", flag)],
                )]
            }
            Self::Google => {
                let daddr = target.pair();
                let (mode, nav_mode) = if walking {
                    ("walking", "w")
                } else {
                    ("bicycling", "b")
                };
                vec![
                    with_query(
                        "comgooglemaps://",
                        &[("daddr", daddr.as_str()), ("directionsmode", mode)],
                    ),
                    // The Android intent scheme carries its parameters in an
                    // opaque path, not a query string.
                    parse(&format!("google.navigation:q={daddr}&mode={nav_mode}")),
                ]
            }
        }
    }
}

impl fmt::Display for MapEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

struct Target<'a> {
    lat: String,
    lon: String,
    name: &'a str,
    mode: TravelMode,
}

impl<'a> Target<'a> {
    fn new(destination: &'a PointOfInterest, mode: TravelMode) -> Self {
        Self {
            lat: format!("{:.6}", destination.coordinate.latitude()),
            lon: format!("{:.6}", destination.coordinate.longitude()),
            name: destination.name.as_str(),
            mode,
        }
    }

    fn pair(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}

fn parse(raw: &str) -> Option<String> {
    match Url::parse(raw) {
        Ok(url) => Some(url.into()),
        Err(err) => {
            warn!("discarding malformed deep link {raw:?}: {err}");
            None
        }
    }
}

fn with_query(base: &str, params: &[(&str, &str)]) -> Option<String> {
    match Url::parse_with_params(base, params) {
        Ok(url) => Some(url.into()),
        Err(err) => {
            warn!("discarding deep link for {base:?}: {err}");
            None
        }
    }
}

fn generic_link(target: &Target<'_>) -> Option<String> {
    let pair = target.pair();
    let label = format!("{pair}({})", target.name);
    with_query(&format!("geo:{pair}"), &[("q", label.as_str())])
}

fn web_link(target: &Target<'_>, preferred: Option<MapEngine>) -> String {
    let walking = target.mode == TravelMode::Walking;
    let china = preferred.is_some_and(MapEngine::serves_mainland_china);
    let link = if china {
        let to = format!("{},{},{}", target.lon, target.lat, target.name);
        with_query(
            "https://uri.amap.com/navigation",
            &[
                ("to", to.as_str()),
                ("mode", if walking { "walk" } else { "ride" }),
                ("callnative", "1"),
                ("src", SOURCE_APPLICATION),
            ],
        )
    } else {
        let destination = target.pair();
        with_query(
            "https://www.google.com/maps/dir/",
            &[
                ("api", "1"),
                ("destination", destination.as_str()),
                ("travelmode", if walking { "walking" } else { "bicycling" }),
            ],
        )
    };
    // The bases above are constants; the fallback keeps the list non-empty
    // even if URL handling ever rejects them.
    link.unwrap_or_else(|| {
        format!(
            "https://www.openstreetmap.org/?mlat={}&mlon={}#map=18/{}/{}",
            target.lat, target.lon, target.lat, target.lon
        )
    })
}

/// Build the ordered candidate list for `destination`.
///
/// Order: the preferred engine's variants, the remaining engines in
/// registry order, a generic `geo:` link, then a web link. The web link is
/// always present, so the list is never empty. Unknown `preferred_engine`
/// values leave the registry order unchanged.
///
/// # Examples
/// ```
/// use relief_core::{Coordinate, PointOfInterest, TravelMode};
/// use relief_core::navigation::{WEB_ENGINE, build_candidates};
///
/// let poi = PointOfInterest::new("1", "WC", "", Coordinate::try_new(31.2317, 121.4750)?);
/// let links = build_candidates(&poi, TravelMode::Walking, "baidu");
///
/// assert_eq!(links.first().map(|c| c.engine.as_str()), Some("baidu"));
/// assert_eq!(links.last().map(|c| c.engine.as_str()), Some(WEB_ENGINE));
/// # Ok::<(), relief_core::CoordinateError>(())
/// ```
#[must_use]
pub fn build_candidates(
    destination: &PointOfInterest,
    mode: TravelMode,
    preferred_engine: &str,
) -> Vec<LinkCandidate> {
    let target = Target::new(destination, mode);
    let preferred = MapEngine::from_id(preferred_engine);
    if preferred.is_none() {
        warn!("unknown preferred engine {preferred_engine:?}; using registry order");
    }

    let engines = preferred
        .into_iter()
        .chain(MapEngine::ALL.into_iter().filter(|e| Some(*e) != preferred));

    let mut links: Vec<(String, String)> = Vec::new();
    for engine in engines {
        links.extend(
            engine
                .deep_links(&target)
                .into_iter()
                .flatten()
                .map(|uri| (uri, engine.id().to_owned())),
        );
    }
    if let Some(uri) = generic_link(&target) {
        links.push((uri, GENERIC_ENGINE.to_owned()));
    }
    links.push((web_link(&target, preferred), WEB_ENGINE.to_owned()));

    links
        .into_iter()
        .enumerate()
        .map(|(rank, (uri, engine))| LinkCandidate { uri, engine, rank })
        .collect()
}
