//! Asset records and their classification

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Backend classification of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Layer-1/layer-2 chain
    Chain,
    /// Protocol or application deployed on a chain
    Application,
    /// Missing or unrecognised classification
    #[default]
    Unknown,
}

impl AssetKind {
    /// Classify a raw type string from the mapping document
    ///
    /// Comparison is case-insensitive; anything other than `chain` or
    /// `application` is [`AssetKind::Unknown`].
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "chain" => Self::Chain,
            "application" => Self::Application,
            _ => Self::Unknown,
        }
    }

    /// Upper-case group name used by the chart backend
    #[inline]
    #[must_use]
    pub const fn group(self) -> &'static str {
        match self {
            Self::Chain => "CHAIN",
            Self::Application => "APPLICATION",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for AssetKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Chain => "chain",
            Self::Application => "application",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// One backend asset
///
/// `symbols` keeps the document order; the first entry is canonical. The list
/// is empty only when every symbol of the asset was claimed by another id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRecord {
    id: String,
    symbols: Vec<String>,
    kind: AssetKind,
}

impl AssetRecord {
    /// Create a record
    #[must_use]
    pub fn new(id: impl Into<String>, symbols: Vec<String>, kind: AssetKind) -> Self {
        Self {
            id: id.into(),
            symbols,
            kind,
        }
    }

    /// Backend id (case-sensitive)
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Symbols in document order
    #[inline]
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Asset classification
    #[inline]
    #[must_use]
    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Canonical symbol, falling back to the id when no symbol survived
    #[must_use]
    pub fn canonical_symbol(&self) -> &str {
        self.symbols.first().map_or(self.id.as_str(), String::as_str)
    }

    /// Human-readable name: the id with only its first letter upper-cased
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name_for(&self.id)
    }
}

/// Display name derived from a raw asset id
#[must_use]
pub fn display_name_for(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(AssetKind::classify("Chain"), AssetKind::Chain);
        assert_eq!(AssetKind::classify("APPLICATION"), AssetKind::Application);
        assert_eq!(AssetKind::classify("token"), AssetKind::Unknown);
        assert_eq!(AssetKind::classify(""), AssetKind::Unknown);
    }

    #[test]
    fn group_names() {
        assert_eq!(AssetKind::Chain.group(), "CHAIN");
        assert_eq!(AssetKind::Unknown.group(), "UNKNOWN");
    }

    #[test]
    fn canonical_symbol_prefers_first() {
        let record = AssetRecord::new(
            "solana",
            vec!["sol".to_string(), "solana".to_string()],
            AssetKind::Chain,
        );
        assert_eq!(record.canonical_symbol(), "sol");

        let bare = AssetRecord::new("orphan", Vec::new(), AssetKind::Unknown);
        assert_eq!(bare.canonical_symbol(), "orphan");
    }

    #[test]
    fn display_name_capitalizes() {
        assert_eq!(display_name_for("solana"), "Solana");
        assert_eq!(display_name_for("ETHEREUM"), "Ethereum");
        assert_eq!(display_name_for(""), "");
    }
}
