//! Error types for descriptor encoding

/// Errors raised while encoding a descriptor as a backend URL
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// Base path is not an http(s) URL
    #[error("invalid chart base url: '{0}'")]
    InvalidBase(String),

    /// JSON encoding failed
    #[error("descriptor serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
