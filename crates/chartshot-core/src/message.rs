//! Pipeline failures and their user-facing text

use chartshot_capture::FailureKind;
use chartshot_command::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Message for [`RunFailureKind::AuthRequired`]
pub const AUTH_REQUIRED_MESSAGE: &str =
    "Authentication required. Please contact your administrator for access.";

/// Message for [`RunFailureKind::InvalidParameters`]
pub const INVALID_PARAMETERS_MESSAGE: &str = "Invalid chart parameters. Please check your input.";

/// Message for [`RunFailureKind::RenderFailed`]
pub const RENDER_FAILED_MESSAGE: &str = "Chart generation failed. Please try again later.";

/// Why a pipeline run produced no chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunFailureKind {
    /// Command text did not parse
    InvalidCommand,
    /// Backend refused the session
    AuthRequired,
    /// Nothing to plot
    NoData,
    /// Backend could not be reached for these parameters
    InvalidParameters,
    /// Any other capture failure
    RenderFailed,
}

impl RunFailureKind {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::NoData => "NO_DATA",
            Self::InvalidParameters => "INVALID_PARAMETERS",
            Self::RenderFailed => "RENDER_FAILED",
        }
    }
}

impl Display for RunFailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<FailureKind> for RunFailureKind {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::AuthRequired => Self::AuthRequired,
            FailureKind::NoData => Self::NoData,
            FailureKind::InvalidParameters => Self::InvalidParameters,
            FailureKind::RenderFailed => Self::RenderFailed,
        }
    }
}

/// Failed run, carrying the text to show the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PipelineFailure {
    /// Classification
    pub kind: RunFailureKind,
    /// User-facing text
    pub message: String,
}

impl PipelineFailure {
    /// Failure for a capture outcome; `asset_names` fill the no-data template
    #[must_use]
    pub fn from_capture(kind: FailureKind, asset_names: &[String]) -> Self {
        let message = match kind {
            FailureKind::AuthRequired => AUTH_REQUIRED_MESSAGE.to_string(),
            FailureKind::NoData => no_data_message(asset_names),
            FailureKind::InvalidParameters => INVALID_PARAMETERS_MESSAGE.to_string(),
            FailureKind::RenderFailed => RENDER_FAILED_MESSAGE.to_string(),
        };
        Self {
            kind: kind.into(),
            message,
        }
    }

    /// Generic render failure, for errors outside the capture engine
    #[must_use]
    pub fn render_failed() -> Self {
        Self {
            kind: RunFailureKind::RenderFailed,
            message: RENDER_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<ParseError> for PipelineFailure {
    fn from(err: ParseError) -> Self {
        Self {
            kind: RunFailureKind::InvalidCommand,
            message: err.to_string(),
        }
    }
}

/// No-data text naming the requested assets
#[must_use]
pub fn no_data_message(asset_names: &[String]) -> String {
    format!(
        "No data available for {}. Try different time periods or metrics.",
        asset_names.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn capture_kinds_map_to_templates() {
        let names = vec!["Solana".to_string(), "Ethereum".to_string()];
        assert_eq!(
            PipelineFailure::from_capture(FailureKind::NoData, &names).message,
            "No data available for Solana, Ethereum. Try different time periods or metrics."
        );
        assert_eq!(
            PipelineFailure::from_capture(FailureKind::AuthRequired, &names).message,
            AUTH_REQUIRED_MESSAGE
        );
        let invalid = PipelineFailure::from_capture(FailureKind::InvalidParameters, &names);
        assert_eq!(invalid.kind, RunFailureKind::InvalidParameters);
        assert_eq!(invalid.message, INVALID_PARAMETERS_MESSAGE);
        assert_eq!(
            PipelineFailure::from_capture(FailureKind::RenderFailed, &names).to_string(),
            RENDER_FAILED_MESSAGE
        );
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(RunFailureKind::InvalidCommand.to_string(), "INVALID_COMMAND");
        assert_eq!(RunFailureKind::from(FailureKind::NoData), RunFailureKind::NoData);
    }
}
