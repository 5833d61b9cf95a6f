//! chartshot Command Parser
//!
//! Turns a free-text chart command such as `price vs tvl solana 1w 1d` into a
//! validated [`ChartRequest`].
//!
//! # Overview
//!
//! - **Vocabularies**: closed [`Metric`], [`TimePeriod`] and [`Granularity`] sets
//! - **CommandParser**: tokenizer, `vs`-chain handling, validation and asset
//!   resolution against an explicitly passed registry
//! - **ParseError**: reason plus a context-aware usage hint
//!
//! # Example
//!
//! ```rust
//! use chartshot_asset::{AssetRegistry, MappingDocument};
//! use chartshot_command::{CommandParser, Metric};
//! use std::sync::Arc;
//!
//! let doc = MappingDocument::new().with_asset("solana", ["sol", "solana"], "chain");
//! let parser = CommandParser::new(Arc::new(AssetRegistry::from_document(doc).unwrap()));
//!
//! let request = parser.parse("price vs tvl solana 1w 1d", false).unwrap();
//! assert_eq!(request.metrics(), &[Metric::Price, Metric::Tvl]);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod parser;
pub mod request;
pub mod vocab;

// Re-exports
pub use error::{ParseError, ParseErrorKind, RequestError};
pub use parser::{CommandParser, DEFAULT_GROUP_PREFIX};
pub use request::{ChartRequest, MAX_METRICS};
pub use vocab::{Granularity, Metric, TimePeriod};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for command parsing
    pub use crate::{
        ChartRequest, CommandParser, Granularity, Metric, ParseError, ParseErrorKind, TimePeriod,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
