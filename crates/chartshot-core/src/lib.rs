//! chartshot Pipeline
//!
//! Free-text chart command in, cropped chart image (plus optional caption)
//! out. Wires the asset registry, command parser, descriptor builder and
//! capture engine together and maps every failure to user-facing text.
//!
//! # Overview
//!
//! - **ChartPipeline**: `run(raw, is_group)` returning [`ChartReply`] or [`PipelineFailure`]
//! - **ChartshotConfig**: TOML file plus `CHARTSHOT_*` environment overrides
//! - **Summarizer**: optional caption collaborator, bounded and non-fatal
//!
//! # Example
//!
//! ```rust
//! use chartshot_core::{ChartshotConfig, PipelineFailure, RunFailureKind};
//! use chartshot_capture::FailureKind;
//!
//! let config = ChartshotConfig::from_toml_str("[cache]\nttl_secs = 60").unwrap();
//! assert_eq!(config.cache.ttl_secs, 60);
//!
//! let failure = PipelineFailure::from_capture(FailureKind::NoData, &["Solana".to_string()]);
//! assert_eq!(failure.kind, RunFailureKind::NoData);
//! assert!(failure.message.starts_with("No data available for Solana."));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod message;
pub mod pipeline;
pub mod summarize;

// Re-exports
pub use config::{derive_cookie_domain, AuthSettings, CacheConfig, CaptureTimings, ChartshotConfig};
pub use error::{ConfigError, SetupError, SummaryError};
pub use message::{no_data_message, PipelineFailure, RunFailureKind};
pub use pipeline::{ChartPipeline, ChartPlan, ChartReply};
pub use summarize::{NoSummarizer, Summarizer};

pub use chartshot_command::CommandParser;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running the pipeline
    pub use crate::{ChartPipeline, ChartReply, ChartshotConfig, PipelineFailure, RunFailureKind, Summarizer};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
