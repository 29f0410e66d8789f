//! The POI source seam.

use std::sync::Arc;

use async_trait::async_trait;

use super::SearchQuery;
use crate::{ProviderError, RawPoi};

/// Where a strategy's data comes from.
///
/// Remote strategies receive the query with its radius clamped to
/// [`provider_radius_meters`](SearchQuery::provider_radius_meters).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// A network service.
    Remote,
    /// Data bundled with the process.
    Local,
}

/// A single source of raw POI records.
///
/// Implementations map provider-specific payloads into [`RawPoi`] values and
/// report transport or payload failures as [`ProviderError`]. Distance
/// computation, radius filtering, sorting and truncation are the
/// aggregator's job, so adapters may return unsorted or out-of-radius data.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use relief_core::{ProviderError, RawPoi, SearchQuery, SearchStrategy};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl SearchStrategy for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     async fn fetch(&self, _query: &SearchQuery) -> Result<Vec<RawPoi>, ProviderError> {
///         Ok(vec![RawPoi::new("1", "WC", "", 31.2317, 121.4750)])
///     }
/// }
/// ```
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str;

    /// Whether the strategy talks to a network service.
    fn kind(&self) -> StrategyKind {
        StrategyKind::Remote
    }

    /// Fetch raw records around `query.center()`.
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPoi>, ProviderError>;
}

#[async_trait]
impl<T: SearchStrategy + ?Sized> SearchStrategy for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn kind(&self) -> StrategyKind {
        (**self).kind()
    }

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPoi>, ProviderError> {
        (**self).fetch(query).await
    }
}
