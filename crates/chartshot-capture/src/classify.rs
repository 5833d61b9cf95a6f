//! Transport failure classification
//!
//! The rendering backend rejects unauthenticated sessions by refusing the
//! connection, and an unresolvable host means the chart parameters produced a
//! bad URL. Everything else is a plain render failure with the raw text kept.

use crate::outcome::{CaptureFailure, FailureKind};
use crate::session::DriverError;

/// Browser error text for a refused connection
pub const CONNECTION_REFUSED: &str = "net::ERR_CONNECTION_REFUSED";

/// Browser error text for a failed DNS lookup
pub const NAME_NOT_RESOLVED: &str = "net::ERR_NAME_NOT_RESOLVED";

/// Map raw error text to a failure kind
#[must_use]
pub fn classify_message(message: &str) -> FailureKind {
    if message.contains(CONNECTION_REFUSED) {
        FailureKind::AuthRequired
    } else if message.contains(NAME_NOT_RESOLVED) {
        FailureKind::InvalidParameters
    } else {
        FailureKind::RenderFailed
    }
}

/// Classify a driver error raised during `stage`
#[must_use]
pub fn classify_driver_error(stage: &str, err: &DriverError) -> CaptureFailure {
    let text = err.to_string();
    CaptureFailure::new(classify_message(&text), format!("{stage}: {text}"))
}
