//! Mapping sources
//!
//! A [`MappingSource`] is the load function injected into the registry.
//! Reading it is the only I/O the registry ever performs.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Symbols for one id: a bare string or an ordered list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolList {
    /// Single symbol
    One(String),
    /// Ordered symbols, first is canonical
    Many(Vec<String>),
}

impl SymbolList {
    /// Symbols in document order
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(symbol) => vec![symbol.clone()],
            Self::Many(symbols) => symbols.clone(),
        }
    }
}

/// Mapping document as stored by the backend sync job
///
/// Unknown top-level keys (derived reverse tables) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDocument {
    /// id -> symbols
    #[serde(rename = "artemis_id_to_symbols", default)]
    pub id_to_symbols: BTreeMap<String, SymbolList>,

    /// id -> raw type string
    #[serde(rename = "artemis_id_to_type", default)]
    pub id_to_type: BTreeMap<String, String>,
}

impl MappingDocument {
    /// Create an empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset (builder style)
    #[must_use]
    pub fn with_asset<I, S>(mut self, id: &str, symbols: I, kind: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_to_symbols.insert(
            id.to_string(),
            SymbolList::Many(symbols.into_iter().map(Into::into).collect()),
        );
        self.id_to_type.insert(id.to_string(), kind.to_string());
        self
    }

    /// Parse a JSON document
    ///
    /// # Errors
    /// Returns [`LoadError::Malformed`] if the text is not a mapping document
    pub fn from_json(text: &str, origin: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|e| LoadError::malformed(origin, e))
    }

    /// Number of ids in the document
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_symbols.len()
    }

    /// Whether the document lists no ids
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_symbols.is_empty()
    }
}

/// Injected load function for the registry
pub trait MappingSource: Send + Sync {
    /// Human-readable origin, used in logs and errors
    fn describe(&self) -> String;

    /// Read the full mapping document
    fn read(&self) -> Result<MappingDocument, LoadError>;
}

impl MappingSource for MappingDocument {
    fn describe(&self) -> String {
        "inline document".to_string()
    }

    fn read(&self) -> Result<MappingDocument, LoadError> {
        Ok(self.clone())
    }
}

impl<F> MappingSource for F
where
    F: Fn() -> Result<MappingDocument, LoadError> + Send + Sync,
{
    fn describe(&self) -> String {
        "load function".to_string()
    }

    fn read(&self) -> Result<MappingDocument, LoadError> {
        self()
    }
}

/// JSON mapping file on local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Create source for path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path being read
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<MappingDocument, LoadError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| LoadError::io(&self.path, e))?;
        MappingDocument::from_json(&text, &self.describe())
    }
}
