//! chartshot Asset Registry
//!
//! In-memory, bidirectional index between backend asset ids and the
//! human-readable symbols users type.
//!
//! # Overview
//!
//! - **AssetRecord**: one backend asset with its ordered symbols and kind
//! - **AssetRegistry**: O(1) lookup by symbol (case-insensitive) or id
//!   (case-sensitive), swapped atomically on reload
//! - **MappingSource**: the injected load function; reload is the only I/O
//!
//! # Example
//!
//! ```rust
//! use chartshot_asset::{AssetKind, AssetRegistry, MappingDocument};
//!
//! let doc = MappingDocument::new()
//!     .with_asset("solana", ["sol", "solana"], "chain");
//! let registry = AssetRegistry::from_document(doc).unwrap();
//!
//! let record = registry.resolve_by_symbol("SOL").unwrap();
//! assert_eq!(record.id(), "solana");
//! assert_eq!(record.kind(), AssetKind::Chain);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod registry;
pub mod source;

// Re-exports
pub use error::LoadError;
pub use record::{AssetKind, AssetRecord};
pub use registry::{AssetIndex, AssetRegistry};
pub use source::{JsonFileSource, MappingDocument, MappingSource, SymbolList};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for asset lookups
    pub use crate::{AssetKind, AssetRecord, AssetRegistry, LoadError, MappingDocument, MappingSource};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
