//! Asset registry with atomic reload
//!
//! Provides [`AssetRegistry`] for O(1) symbol and id lookup.
//!
//! The index itself ([`AssetIndex`]) is immutable once built. The registry
//! holds it behind an `RwLock<Arc<_>>` so a reload builds the replacement off
//! to the side and swaps it in with a single write; readers only ever clone
//! the `Arc`.

use crate::error::LoadError;
use crate::record::{AssetKind, AssetRecord};
use crate::source::{MappingDocument, MappingSource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable lookup tables built from one mapping document
#[derive(Debug, Default)]
pub struct AssetIndex {
    records: Vec<Arc<AssetRecord>>,
    by_id: HashMap<String, usize>,
    by_symbol: HashMap<String, usize>,
}

impl AssetIndex {
    /// Build the index in a single pass over the document
    ///
    /// Ids are visited in sorted order. A symbol already claimed by an earlier
    /// id is dropped from the later record so each symbol resolves to exactly
    /// one id.
    ///
    /// # Errors
    /// Returns error for an empty id or a document without assets
    pub fn build(doc: &MappingDocument, origin: &str) -> Result<Self, LoadError> {
        if doc.is_empty() {
            return Err(LoadError::NoAssets(origin.to_string()));
        }

        let mut index = Self {
            records: Vec::with_capacity(doc.len()),
            by_id: HashMap::with_capacity(doc.len()),
            by_symbol: HashMap::with_capacity(doc.len() * 2),
        };

        for (id, symbol_list) in &doc.id_to_symbols {
            if id.trim().is_empty() {
                return Err(LoadError::InvalidEntry(format!(
                    "empty asset id in {origin}"
                )));
            }

            let slot = index.records.len();
            let kind = doc
                .id_to_type
                .get(id)
                .map_or(AssetKind::Unknown, |raw| AssetKind::classify(raw));

            let mut symbols = Vec::new();
            for raw in symbol_list.to_vec() {
                let symbol = raw.trim();
                if symbol.is_empty() {
                    continue;
                }
                let key = symbol.to_lowercase();
                if let Some(&owner) = index.by_symbol.get(&key) {
                    if owner != slot {
                        tracing::warn!(
                            symbol = %key,
                            kept = %index.records[owner].id(),
                            dropped = %id,
                            "symbol claimed by more than one asset id"
                        );
                    }
                    continue;
                }
                index.by_symbol.insert(key, slot);
                symbols.push(symbol.to_string());
            }

            index.by_id.insert(id.clone(), slot);
            index
                .records
                .push(Arc::new(AssetRecord::new(id.clone(), symbols, kind)));
        }

        Ok(index)
    }

    /// Lookup by symbol, case-insensitive
    #[must_use]
    pub fn by_symbol(&self, symbol: &str) -> Option<Arc<AssetRecord>> {
        self.by_symbol
            .get(&symbol.trim().to_lowercase())
            .map(|&slot| Arc::clone(&self.records[slot]))
    }

    /// Lookup by id, case-sensitive
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<Arc<AssetRecord>> {
        self.by_id
            .get(id)
            .map(|&slot| Arc::clone(&self.records[slot]))
    }

    /// Number of assets
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no assets
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AssetRecord>> {
        self.records.iter()
    }
}

/// Registry handed explicitly to the parser and the descriptor builder
#[derive(Debug)]
pub struct AssetRegistry {
    index: RwLock<Arc<AssetIndex>>,
}

impl AssetRegistry {
    /// Build a registry by reading a source
    ///
    /// # Errors
    /// Returns [`LoadError`] if the source is unreadable or malformed
    pub fn load(source: &dyn MappingSource) -> Result<Self, LoadError> {
        let index = Self::read_index(source)?;
        Ok(Self {
            index: RwLock::new(Arc::new(index)),
        })
    }

    /// Build a registry from an in-memory document
    ///
    /// # Errors
    /// Returns [`LoadError`] if the document violates registry invariants
    pub fn from_document(doc: MappingDocument) -> Result<Self, LoadError> {
        Self::load(&doc)
    }

    /// Replace the index with a fresh read of `source`
    ///
    /// On error the current index is left untouched.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the source is unreadable or malformed
    pub fn reload(&self, source: &dyn MappingSource) -> Result<(), LoadError> {
        let index = Self::read_index(source)?;
        *self.index.write() = Arc::new(index);
        Ok(())
    }

    fn read_index(source: &dyn MappingSource) -> Result<AssetIndex, LoadError> {
        let origin = source.describe();
        let doc = source.read()?;
        let index = AssetIndex::build(&doc, &origin)?;
        tracing::info!(origin = %origin, assets = index.len(), "asset mappings loaded");
        Ok(index)
    }

    /// Current index snapshot
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<AssetIndex> {
        Arc::clone(&self.index.read())
    }

    /// Lookup by symbol, case-insensitive
    #[must_use]
    pub fn resolve_by_symbol(&self, symbol: &str) -> Option<Arc<AssetRecord>> {
        self.snapshot().by_symbol(symbol)
    }

    /// Lookup by id, case-sensitive
    #[must_use]
    pub fn resolve_by_id(&self, id: &str) -> Option<Arc<AssetRecord>> {
        self.snapshot().by_id(id)
    }

    /// Symbol-then-id lookup used for user tokens
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<Arc<AssetRecord>> {
        let index = self.snapshot();
        index.by_symbol(token).or_else(|| index.by_id(token))
    }

    /// Number of assets in the current index
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    /// Whether the current index is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SymbolList;
    use pretty_assertions::assert_eq;

    fn sample() -> MappingDocument {
        MappingDocument::new()
            .with_asset("solana", ["sol", "solana"], "chain")
            .with_asset("ethereum", ["eth", "ethereum"], "chain")
            .with_asset("uniswap", ["UNI"], "application")
    }

    #[test]
    fn symbol_lookup_is_case_insensitive() {
        let registry = AssetRegistry::from_document(sample()).unwrap();

        let record = registry.resolve_by_symbol("SoL").unwrap();
        assert_eq!(record.id(), "solana");
        assert_eq!(record.kind(), AssetKind::Chain);

        let uni = registry.resolve_by_symbol("uni").unwrap();
        assert_eq!(uni.id(), "uniswap");
        assert_eq!(uni.canonical_symbol(), "UNI");
    }

    #[test]
    fn id_lookup_is_case_sensitive() {
        let registry = AssetRegistry::from_document(sample()).unwrap();
        assert!(registry.resolve_by_id("ethereum").is_some());
        assert!(registry.resolve_by_id("Ethereum").is_none());
    }

    #[test]
    fn resolve_falls_back_to_id() {
        let mut doc = sample();
        doc.id_to_symbols
            .insert("arbitrum".to_string(), SymbolList::One("arb".to_string()));
        let registry = AssetRegistry::from_document(doc).unwrap();

        assert_eq!(registry.resolve("arb").unwrap().id(), "arbitrum");
        assert_eq!(registry.resolve("arbitrum").unwrap().id(), "arbitrum");
        assert_eq!(
            registry.resolve("arbitrum").unwrap().kind(),
            AssetKind::Unknown
        );
        assert!(registry.resolve("dogecoin_invalid").is_none());
    }

    #[test]
    fn duplicate_symbol_keeps_first_id() {
        let doc = MappingDocument::new()
            .with_asset("alpha", ["shared", "a"], "chain")
            .with_asset("beta", ["shared", "b"], "application");
        let registry = AssetRegistry::from_document(doc).unwrap();

        assert_eq!(registry.resolve_by_symbol("shared").unwrap().id(), "alpha");
        let beta = registry.resolve_by_id("beta").unwrap();
        assert_eq!(beta.symbols(), &["b".to_string()]);
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = AssetRegistry::from_document(MappingDocument::new()).unwrap_err();
        assert!(matches!(err, LoadError::NoAssets(_)));
    }

    #[test]
    fn empty_id_is_rejected() {
        let doc = MappingDocument::new().with_asset(" ", ["x"], "chain");
        let err = AssetRegistry::from_document(doc).unwrap_err();
        assert!(matches!(err, LoadError::InvalidEntry(_)));
    }

    #[test]
    fn reload_swaps_index() {
        let registry = AssetRegistry::from_document(sample()).unwrap();
        assert_eq!(registry.len(), 3);

        let next = MappingDocument::new().with_asset("bitcoin", ["btc"], "chain");
        registry.reload(&next).unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("sol").is_none());
        assert_eq!(registry.resolve("BTC").unwrap().id(), "bitcoin");
    }

    #[test]
    fn failed_reload_keeps_previous_index() {
        let registry = AssetRegistry::from_document(sample()).unwrap();
        let failing = || -> Result<MappingDocument, LoadError> {
            Err(LoadError::InvalidEntry("upstream unavailable".to_string()))
        };

        assert!(registry.reload(&failing).is_err());
        assert_eq!(registry.len(), 3);
        assert!(registry.resolve("eth").is_some());
    }

    #[test]
    fn snapshot_survives_reload() {
        let registry = AssetRegistry::from_document(sample()).unwrap();
        let before = registry.snapshot();

        registry
            .reload(&MappingDocument::new().with_asset("bitcoin", ["btc"], "chain"))
            .unwrap();

        assert_eq!(before.len(), 3);
        assert!(before.by_symbol("sol").is_some());
    }
}
