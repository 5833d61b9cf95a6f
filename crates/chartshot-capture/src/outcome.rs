//! Capture outcomes
//!
//! Success and failure are separate variants; a failed capture never
//! masquerades as image bytes.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Encoded PNG bytes, shared between the cache and callers
pub type ImageBytes = Arc<[u8]>;

/// Classified reason a capture produced no image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Backend refused the unauthenticated session
    AuthRequired,
    /// Rendered page has nothing to plot
    NoData,
    /// Backend could not be resolved for these parameters
    InvalidParameters,
    /// Anything else, including timeouts
    RenderFailed,
}

impl FailureKind {
    /// Wire name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::NoData => "NO_DATA",
            Self::InvalidParameters => "INVALID_PARAMETERS",
            Self::RenderFailed => "RENDER_FAILED",
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure carried out of the render path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct CaptureFailure {
    /// Classification
    pub kind: FailureKind,
    /// Raw detail for logs
    pub detail: String,
}

impl CaptureFailure {
    /// Create failure
    #[must_use]
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// No-data failure
    #[must_use]
    pub fn no_data(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::NoData, detail)
    }

    /// Generic render failure
    #[must_use]
    pub fn render_failed(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::RenderFailed, detail)
    }
}

/// Result of one capture request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Cropped chart image
    Success {
        /// PNG bytes
        image: ImageBytes,
    },
    /// Classified failure
    Failure {
        /// Classification
        kind: FailureKind,
        /// Raw detail for logs
        detail: String,
    },
}

impl CaptureOutcome {
    /// Whether an image was produced
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Image bytes on success
    #[must_use]
    pub fn image(&self) -> Option<&ImageBytes> {
        match self {
            Self::Success { image } => Some(image),
            Self::Failure { .. } => None,
        }
    }

    /// Failure kind on failure
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<CaptureFailure> for CaptureOutcome {
    fn from(failure: CaptureFailure) -> Self {
        Self::Failure {
            kind: failure.kind,
            detail: failure.detail,
        }
    }
}

impl From<Result<ImageBytes, CaptureFailure>> for CaptureOutcome {
    fn from(result: Result<ImageBytes, CaptureFailure>) -> Self {
        match result {
            Ok(image) => Self::Success { image },
            Err(failure) => failure.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_converts_to_outcome() {
        let outcome: CaptureOutcome = CaptureFailure::no_data("marker visible").into();
        assert_eq!(outcome.failure_kind(), Some(FailureKind::NoData));
        assert!(outcome.image().is_none());
    }

    #[test]
    fn success_exposes_image() {
        let image: ImageBytes = Arc::from(vec![1u8, 2, 3]);
        let outcome = CaptureOutcome::from(Ok::<_, CaptureFailure>(image.clone()));
        assert!(outcome.is_success());
        assert_eq!(outcome.image(), Some(&image));
    }

    #[test]
    fn kind_wire_names() {
        assert_eq!(FailureKind::AuthRequired.to_string(), "AUTH_REQUIRED");
        assert_eq!(
            serde_json::to_string(&FailureKind::InvalidParameters).unwrap(),
            "\"INVALID_PARAMETERS\""
        );
        assert_eq!(
            CaptureFailure::render_failed("boom").to_string(),
            "RENDER_FAILED: boom"
        );
    }
}
