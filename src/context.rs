//! Shared state threaded through extraction and rendering.
//!
//! One [`ImportContext`] value owns the identifier registry and the item
//! cache for a run. It is passed by mutable reference, never held in a
//! process global, so two conversions cannot bleed identifiers into each
//! other.

use std::collections::HashMap;

use crate::ident::IdentRegistry;
use crate::model::TypeCode;

/// Cached record of an extracted item, keyed by its raw key.
#[derive(Debug, Clone)]
pub struct CachedItem {
    pub key: String,
    pub safe_key: String,
    pub value_type: String,
    pub type_code: TypeCode,
    /// Resource kind assigned when the item's block is emitted. Stays
    /// `None` for items of no-op types, which makes triggers referencing
    /// them fail resolution instead of pointing at a missing resource.
    pub resource_kind: Option<&'static str>,
}

/// Global lookup from raw item key to its cached record.
///
/// Shared across all templates and discovery rules in a document; when
/// two items anywhere share a raw key, the later one wins.
#[derive(Debug, Default)]
pub struct ItemCache {
    entries: HashMap<String, CachedItem>,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: CachedItem) {
        self.entries.insert(item.key.clone(), item);
    }

    pub fn get(&self, key: &str) -> Option<&CachedItem> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Record the resource kind an item was emitted as.
    pub fn assign_kind(&mut self, key: &str, kind: &'static str) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.resource_kind = Some(kind);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registry and cache for one conversion run.
#[derive(Debug, Default)]
pub struct ImportContext {
    pub idents: IdentRegistry,
    pub items: ItemCache,
}

impl ImportContext {
    pub fn new() -> Self {
        Self::default()
    }
}
