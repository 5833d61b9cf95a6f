//! Descriptor builder
//!
//! Pure and deterministic: the only input besides the request is the registry
//! snapshot used for asset display names and symbols.

use crate::descriptor::{ChartDescriptor, SeriesAsset, SeriesMetric, SeriesSetting, SeriesSpec};
use chartshot_asset::{AssetIndex, AssetRegistry};
use chartshot_command::ChartRequest;
use std::sync::Arc;

/// Series colours, indexed by series position
pub const PALETTE: [&str; 4] = ["#8A88FF", "#FF8A65", "#4DD0E1", "#AED581"];

const LINE: &str = "LINE";
const TIMELINE: &str = "TIMELINE";
const LINEAR: &str = "LINEAR";
const UNITS_PERCENT: &str = "PERCENTAGE";
const UNITS_RAW: &str = "RAW";
const SMA_DISABLED: &str = "0";

/// Builds [`ChartDescriptor`] values from validated requests
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    registry: Arc<AssetRegistry>,
}

impl DescriptorBuilder {
    /// Create builder reading asset details from `registry`
    #[must_use]
    pub fn new(registry: Arc<AssetRegistry>) -> Self {
        Self { registry }
    }

    /// Build the descriptor for a request
    ///
    /// Never fails: an asset dropped from the registry since the request was
    /// parsed falls back to its id for name and symbol.
    #[must_use]
    pub fn build(&self, request: &ChartRequest) -> ChartDescriptor {
        let index = self.registry.snapshot();
        let assets: Vec<SeriesAsset> = request
            .asset_ids()
            .iter()
            .map(|id| series_asset(&index, request, id))
            .collect();

        let mut series = Vec::with_capacity(request.metrics().len() * assets.len());
        for (axis, metric) in request.metrics().iter().enumerate() {
            for asset in &assets {
                let color = PALETTE[series.len() % PALETTE.len()];
                series.push(SeriesSpec {
                    asset: asset.clone(),
                    metric: SeriesMetric {
                        artemis_id: metric.backend_id().to_string(),
                    },
                    setting: SeriesSetting {
                        kind: LINE.to_string(),
                        display: TIMELINE.to_string(),
                        scale: LINEAR.to_string(),
                        units: if request.as_percentage() {
                            UNITS_PERCENT
                        } else {
                            UNITS_RAW
                        }
                        .to_string(),
                        visible: true,
                        show_in_legend: true,
                        color: color.to_string(),
                        y_axis: axis,
                    },
                });
            }
        }

        let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
        ChartDescriptor {
            title: title_for(request, &names),
            description: String::new(),
            period: request.time_period().backend_id().to_string(),
            preview_url: String::new(),
            granularity: request.granularity().backend_id().to_string(),
            sma_period: SMA_DISABLED.to_string(),
            series,
        }
    }

    /// Display names for the request's assets, in request order
    #[must_use]
    pub fn asset_names(&self, request: &ChartRequest) -> Vec<String> {
        let index = self.registry.snapshot();
        request
            .asset_ids()
            .iter()
            .map(|id| {
                index
                    .by_id(id)
                    .map_or_else(|| id.clone(), |record| record.display_name())
            })
            .collect()
    }
}

fn series_asset(index: &AssetIndex, request: &ChartRequest, id: &str) -> SeriesAsset {
    match index.by_id(id) {
        Some(record) => SeriesAsset {
            group: record.kind().group().to_string(),
            artemis_id: record.id().to_string(),
            name: record.display_name(),
            symbol: record.canonical_symbol().to_string(),
            icon_url: String::new(),
        },
        None => SeriesAsset {
            group: request.asset_kind().group().to_string(),
            artemis_id: id.to_string(),
            name: id.to_string(),
            symbol: id.to_string(),
            icon_url: String::new(),
        },
    }
}

/// `<metrics> - <assets> (<period>, <granularity>[, %])`
#[must_use]
pub fn title_for(request: &ChartRequest, asset_names: &[&str]) -> String {
    let metrics: Vec<&str> = request
        .metrics()
        .iter()
        .map(|metric| metric.display_name())
        .collect();
    let percent = if request.as_percentage() { ", %" } else { "" };

    format!(
        "{} - {} ({}, {}{percent})",
        metrics.join(" vs "),
        asset_names.join("/"),
        request.time_period().display_name(),
        request.granularity().display_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartshot_asset::MappingDocument;
    use chartshot_command::CommandParser;
    use pretty_assertions::assert_eq;

    fn registry() -> Arc<AssetRegistry> {
        Arc::new(
            AssetRegistry::from_document(
                MappingDocument::new()
                    .with_asset("solana", ["sol", "solana"], "chain")
                    .with_asset("ethereum", ["eth", "ethereum"], "chain"),
            )
            .unwrap(),
        )
    }

    fn request(text: &str) -> ChartRequest {
        CommandParser::new(registry()).parse(text, false).unwrap()
    }

    #[test]
    fn title_joins_metrics_and_assets() {
        let builder = DescriptorBuilder::new(registry());

        let single = builder.build(&request("price sol 1w 1d"));
        assert_eq!(single.title, "Price - Solana (1 Week, Daily)");

        let pair = builder.build(&request("fees vs revenue eth 6m 1w %"));
        assert_eq!(pair.title, "Fees vs Revenue - Ethereum (6 Months, Weekly, %)");
    }

    #[test]
    fn one_series_per_metric_with_own_axis() {
        let descriptor = DescriptorBuilder::new(registry()).build(&request("price vs tvl sol 1y 1d"));

        assert_eq!(descriptor.series.len(), 2);
        assert_eq!(descriptor.series[0].metric.artemis_id, "PRICE");
        assert_eq!(descriptor.series[1].metric.artemis_id, "TVL");
        assert_eq!(descriptor.series[0].setting.y_axis, 0);
        assert_eq!(descriptor.series[1].setting.y_axis, 1);
        assert_eq!(descriptor.series[0].setting.color, PALETTE[0]);
        assert_eq!(descriptor.series[1].setting.color, PALETTE[1]);
        assert_eq!(descriptor.series[0].asset.symbol, "sol");
        assert_eq!(descriptor.series[0].asset.group, "CHAIN");
        assert_eq!(descriptor.period, "ONE_YEAR");
        assert_eq!(descriptor.granularity, "DAY");
        assert_eq!(descriptor.sma_period, "0");
    }

    #[test]
    fn percentage_sets_units() {
        let builder = DescriptorBuilder::new(registry());
        let raw = builder.build(&request("price sol 1w 1d"));
        let pct = builder.build(&request("price sol 1w 1d %"));
        assert_eq!(raw.series[0].setting.units, "RAW");
        assert_eq!(pct.series[0].setting.units, "PERCENTAGE");
    }

    #[test]
    fn missing_asset_falls_back_to_id() {
        let registry = registry();
        let req = CommandParser::new(Arc::clone(&registry))
            .parse("price sol 1w 1d", false)
            .unwrap();

        registry
            .reload(&MappingDocument::new().with_asset("bitcoin", ["btc"], "chain"))
            .unwrap();

        let builder = DescriptorBuilder::new(Arc::clone(&registry));
        let descriptor = builder.build(&req);
        assert_eq!(descriptor.series[0].asset.name, "solana");
        assert_eq!(descriptor.series[0].asset.symbol, "solana");
        assert_eq!(descriptor.series[0].asset.group, "CHAIN");
        assert_eq!(builder.asset_names(&req), vec!["solana".to_string()]);
    }
}
