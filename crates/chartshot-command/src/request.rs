//! Validated chart request

use crate::error::RequestError;
use crate::vocab::{Granularity, Metric, TimePeriod};
use chartshot_asset::{AssetKind, AssetRegistry};
use serde::Serialize;

/// Most metrics one chart can compare
pub const MAX_METRICS: usize = 2;

/// Structured chart request
///
/// Only constructed through [`ChartRequest::new`], which checks every asset
/// id against the registry, so a value of this type always refers to assets
/// that existed when it was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    metrics: Vec<Metric>,
    asset_ids: Vec<String>,
    asset_kind: AssetKind,
    time_period: TimePeriod,
    granularity: Granularity,
    as_percentage: bool,
}

impl ChartRequest {
    /// Build a request, validating metrics and asset ids
    ///
    /// The request-level asset kind is taken from the first asset.
    ///
    /// # Errors
    /// Returns [`RequestError`] for an empty or oversized metric list, an
    /// empty asset list, or an id the registry does not know
    pub fn new(
        registry: &AssetRegistry,
        metrics: Vec<Metric>,
        asset_ids: Vec<String>,
        time_period: TimePeriod,
        granularity: Granularity,
        as_percentage: bool,
    ) -> Result<Self, RequestError> {
        if metrics.is_empty() {
            return Err(RequestError::NoMetrics);
        }
        if metrics.len() > MAX_METRICS {
            return Err(RequestError::TooManyMetrics(metrics.len()));
        }

        let index = registry.snapshot();
        let mut asset_kind = None;
        for id in &asset_ids {
            let record = index
                .by_id(id)
                .ok_or_else(|| RequestError::UnknownAssetId(id.clone()))?;
            asset_kind.get_or_insert(record.kind());
        }
        let asset_kind = asset_kind.ok_or(RequestError::NoAssets)?;

        Ok(Self {
            metrics,
            asset_ids,
            asset_kind,
            time_period,
            granularity,
            as_percentage,
        })
    }

    /// Metrics in encounter order
    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Resolved asset ids
    #[inline]
    #[must_use]
    pub fn asset_ids(&self) -> &[String] {
        &self.asset_ids
    }

    /// Asset kind shared by the whole request
    #[inline]
    #[must_use]
    pub fn asset_kind(&self) -> AssetKind {
        self.asset_kind
    }

    /// Time window
    #[inline]
    #[must_use]
    pub fn time_period(&self) -> TimePeriod {
        self.time_period
    }

    /// Point spacing
    #[inline]
    #[must_use]
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Whether values are plotted as percentages
    #[inline]
    #[must_use]
    pub fn as_percentage(&self) -> bool {
        self.as_percentage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartshot_asset::MappingDocument;

    fn registry() -> AssetRegistry {
        AssetRegistry::from_document(
            MappingDocument::new()
                .with_asset("solana", ["sol"], "chain")
                .with_asset("uniswap", ["uni"], "application"),
        )
        .unwrap()
    }

    #[test]
    fn kind_comes_from_first_asset() {
        let request = ChartRequest::new(
            &registry(),
            vec![Metric::Fees],
            vec!["uniswap".to_string(), "solana".to_string()],
            TimePeriod::OneMonth,
            Granularity::Daily,
            false,
        )
        .unwrap();

        assert_eq!(request.asset_kind(), AssetKind::Application);
        assert_eq!(request.asset_ids().len(), 2);
    }

    #[test]
    fn rejects_unknown_id() {
        let err = ChartRequest::new(
            &registry(),
            vec![Metric::Price],
            vec!["dogecoin".to_string()],
            TimePeriod::OneWeek,
            Granularity::Daily,
            false,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::UnknownAssetId("dogecoin".to_string()));
    }

    #[test]
    fn rejects_bad_metric_counts() {
        let registry = registry();
        let ids = vec!["solana".to_string()];

        let none = ChartRequest::new(
            &registry,
            Vec::new(),
            ids.clone(),
            TimePeriod::OneWeek,
            Granularity::Daily,
            false,
        );
        assert_eq!(none.unwrap_err(), RequestError::NoMetrics);

        let three = ChartRequest::new(
            &registry,
            vec![Metric::Price, Metric::Tvl, Metric::Fees],
            ids,
            TimePeriod::OneWeek,
            Granularity::Daily,
            false,
        );
        assert_eq!(three.unwrap_err(), RequestError::TooManyMetrics(3));
    }

    #[test]
    fn rejects_empty_assets() {
        let err = ChartRequest::new(
            &registry(),
            vec![Metric::Price],
            Vec::new(),
            TimePeriod::OneWeek,
            Granularity::Daily,
            false,
        )
        .unwrap_err();
        assert_eq!(err, RequestError::NoAssets);
    }
}
