//! Error types for command parsing

use thiserror::Error;

/// Why a command failed to parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Fewer tokens than metric, asset, period and granularity
    #[error("Command must have at least 4 parts: <metric> <asset> <time_period> <granularity>")]
    TooFewParts,

    /// A `vs` with nothing after it
    #[error("'vs' must be followed by a metric")]
    DanglingVs,

    /// More metrics than one chart can compare
    #[error("At most 2 metrics can be compared, got {0}")]
    TooManyMetrics(usize),

    /// Trailing token that is not the `%` flag
    #[error("Unexpected token '{0}' after granularity")]
    UnexpectedToken(String),

    /// Metric outside the closed set
    #[error("Invalid metric '{token}'. Must be one of: {allowed}")]
    InvalidMetric {
        /// Offending token
        token: String,
        /// Canonical tokens
        allowed: String,
    },

    /// Time period outside the closed set
    #[error("Invalid time period '{token}'. Must be one of: {allowed}")]
    InvalidTimePeriod {
        /// Offending token
        token: String,
        /// Canonical tokens
        allowed: String,
    },

    /// Granularity outside the closed set
    #[error("Invalid granularity '{token}'. Must be one of: {allowed}")]
    InvalidGranularity {
        /// Offending token
        token: String,
        /// Canonical tokens
        allowed: String,
    },

    /// Asset token matched neither a symbol nor an id
    #[error("Asset '{0}' not found")]
    UnknownAsset(String),

    /// Request rejected after token validation
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Parse failure carrying the usage hint shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}\n\n{usage}")]
pub struct ParseError {
    kind: ParseErrorKind,
    usage: String,
}

impl ParseError {
    /// Create error with usage hint
    #[must_use]
    pub fn new(kind: ParseErrorKind, usage: impl Into<String>) -> Self {
        Self {
            kind,
            usage: usage.into(),
        }
    }

    /// Failure reason
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// Reason as a sentence
    #[must_use]
    pub fn reason(&self) -> String {
        self.kind.to_string()
    }

    /// Formatted usage hint
    #[inline]
    #[must_use]
    pub fn usage(&self) -> &str {
        &self.usage
    }
}

/// Invariant violations when building a [`crate::ChartRequest`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Empty metric list
    #[error("a chart request needs at least one metric")]
    NoMetrics,

    /// Too many metrics
    #[error("a chart request supports at most 2 metrics, got {0}")]
    TooManyMetrics(usize),

    /// Empty asset list
    #[error("a chart request needs at least one asset")]
    NoAssets,

    /// Id missing from the registry
    #[error("asset id '{0}' is not in the registry")]
    UnknownAssetId(String),
}
