//! Chart descriptor in the backend's wire format
//!
//! Field declaration order is the serialization order; there are no maps, so
//! equal values always serialize to identical bytes.

use serde::{Deserialize, Serialize};

/// Canonical chart specification consumed by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDescriptor {
    /// Human-readable title
    pub title: String,
    /// Always empty
    pub description: String,
    /// Backend time period id
    pub period: String,
    /// Always empty
    pub preview_url: String,
    /// Backend granularity id
    pub granularity: String,
    /// Moving-average window, "0" disables it
    pub sma_period: String,
    /// One entry per (metric, asset) pair, metrics outer
    pub series: Vec<SeriesSpec>,
}

impl ChartDescriptor {
    /// Compact JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One plotted line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// Asset being plotted
    pub asset: SeriesAsset,
    /// Metric being plotted
    pub metric: SeriesMetric,
    /// Display settings
    pub setting: SeriesSetting,
}

/// Asset reference inside a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesAsset {
    /// Upper-case asset kind
    pub group: String,
    /// Backend id
    pub artemis_id: String,
    /// Display name
    pub name: String,
    /// Canonical symbol
    pub symbol: String,
    /// Always empty
    pub icon_url: String,
}

/// Metric reference inside a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesMetric {
    /// Backend metric id
    pub artemis_id: String,
}

/// Fixed display settings for a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSetting {
    /// Line style
    #[serde(rename = "type")]
    pub kind: String,
    /// Display mode
    pub display: String,
    /// Axis scale
    pub scale: String,
    /// `PERCENTAGE` or `RAW`
    pub units: String,
    /// Shown on load
    pub visible: bool,
    /// Listed in the legend
    pub show_in_legend: bool,
    /// Hex colour from the palette
    pub color: String,
    /// Axis index, one per metric
    pub y_axis: usize,
}
