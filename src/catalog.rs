//! Item name catalog and its owned cache.
//!
//! The catalog is the list of every valid item name. It backs dashboard
//! decoding (only known names survive) and the dashboard item picker. The
//! cache loads it once per source and keeps it until explicitly invalidated.

use std::collections::HashMap;

use crate::client::PriceSource;
use crate::error::Result;
use crate::models::{ItemType, NameEntry};

/// Case-insensitive identity key for an item name.
pub fn identity_key(name: &str) -> String {
    name.trim().to_uppercase()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Immutable snapshot of the name catalog, indexed by identity key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<NameEntry>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog; later duplicates of an identity key are ignored.
    pub fn new(entries: Vec<NameEntry>) -> Self {
        let mut kept = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key = identity_key(&entry.name);
            if key.is_empty() || index.contains_key(&key) {
                continue;
            }
            index.insert(key, kept.len());
            kept.push(entry);
        }
        Self {
            entries: kept,
            index,
        }
    }

    /// Look up an entry by identity key (or any casing of its name).
    pub fn resolve(&self, name: &str) -> Option<&NameEntry> {
        self.index
            .get(&identity_key(name))
            .map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Display names in catalog order, as offered by the dashboard picker.
    pub fn options(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Entries belonging to one category (`ItemType::ALL` returns everything).
    pub fn of_type(&self, item_type: ItemType) -> Vec<&NameEntry> {
        self.entries
            .iter()
            .filter(|e| item_type.is_all() || e.item_type == item_type)
            .collect()
    }

    pub fn entries(&self) -> &[NameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CatalogCache
// ---------------------------------------------------------------------------

/// Owns at most one loaded [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogCache {
    catalog: Option<Catalog>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached catalog, loading it from `source` on first use.
    pub fn get_or_load(&mut self, source: &dyn PriceSource) -> Result<&Catalog> {
        if self.catalog.is_none() {
            self.refresh(source)?;
        }
        Ok(self.catalog.get_or_insert_with(Catalog::default))
    }

    /// Reload unconditionally. On failure the previous catalog is kept.
    pub fn refresh(&mut self, source: &dyn PriceSource) -> Result<&Catalog> {
        let names = source.fetch_names()?;
        let catalog = Catalog::new(names);
        tracing::info!(names = catalog.len(), "catalog refreshed");
        Ok(self.catalog.insert(catalog))
    }

    /// Drop the cached catalog so the next access reloads it.
    pub fn invalidate(&mut self) {
        if self.catalog.take().is_some() {
            tracing::debug!("catalog invalidated");
        }
    }

    /// The cached catalog, if loaded.
    pub fn cached(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }
}
