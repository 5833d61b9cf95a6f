//! chartshot Request Descriptors
//!
//! Converts a validated [`chartshot_command::ChartRequest`] into the chart
//! backend's descriptor, its canonical URL and the capture fingerprint.
//!
//! # Overview
//!
//! - **DescriptorBuilder**: request to [`ChartDescriptor`], deterministic and pure
//! - **ChartEndpoint**: base path plus percent-encoded compact JSON
//! - **Fingerprint**: Blake3 of the full URL, the capture cache key
//!
//! # Example
//!
//! ```rust
//! use chartshot_asset::{AssetRegistry, MappingDocument};
//! use chartshot_command::CommandParser;
//! use chartshot_descriptor::{ChartEndpoint, DescriptorBuilder};
//! use std::sync::Arc;
//!
//! let doc = MappingDocument::new().with_asset("solana", ["sol"], "chain");
//! let registry = Arc::new(AssetRegistry::from_document(doc).unwrap());
//! let request = CommandParser::new(Arc::clone(&registry))
//!     .parse("price sol 1w 1d", false)
//!     .unwrap();
//!
//! let descriptor = DescriptorBuilder::new(registry).build(&request);
//! assert_eq!(descriptor.title, "Price - Solana (1 Week, Daily)");
//!
//! let (url, fingerprint) = ChartEndpoint::default().locate(&descriptor).unwrap();
//! assert!(url.starts_with("https://app.artemisanalytics.com/chart-builder/%7B"));
//! assert_eq!(fingerprint.to_string().len(), 64);
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod descriptor;
pub mod endpoint;
pub mod error;
pub mod fingerprint;

// Re-exports
pub use builder::{title_for, DescriptorBuilder, PALETTE};
pub use descriptor::{ChartDescriptor, SeriesAsset, SeriesMetric, SeriesSetting, SeriesSpec};
pub use endpoint::{ChartEndpoint, DEFAULT_BASE_URL};
pub use error::DescriptorError;
pub use fingerprint::{Fingerprint, FingerprintError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for descriptor building
    pub use crate::{ChartDescriptor, ChartEndpoint, DescriptorBuilder, DescriptorError, Fingerprint};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
