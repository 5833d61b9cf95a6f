//! Error types for the pipeline crate
//!
//! Setup can fail (configuration, mapping file, endpoint, driver client);
//! a running pipeline never does. Runs end in a [`crate::PipelineFailure`]
//! instead.

use chartshot_asset::LoadError;
use chartshot_capture::DriverError;
use chartshot_descriptor::DescriptorError;

/// Invalid configuration value
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file path
        path: std::path::PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the config schema
    #[error("malformed config: {0}")]
    Malformed(#[from] toml::de::Error),

    /// Environment override could not be parsed
    #[error("invalid value {value:?} for {var}: expected {expected}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
        /// Expected shape
        expected: &'static str,
    },

    /// Chart base URL has no host to scope the auth cookie to
    #[error("cannot derive cookie domain from {0:?}")]
    CookieDomain(String),
}

/// Failure while assembling a pipeline
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Bad configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Asset mappings unreadable
    #[error("asset mappings: {0}")]
    Load(#[from] LoadError),

    /// Chart endpoint rejected
    #[error("chart endpoint: {0}")]
    Endpoint(#[from] DescriptorError),

    /// Driver client could not be built
    #[error("webdriver: {0}")]
    Driver(#[from] DriverError),
}

/// Summarization collaborator failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("summarizer failed: {0}")]
pub struct SummaryError(pub String);

impl SummaryError {
    /// Create error from any message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
