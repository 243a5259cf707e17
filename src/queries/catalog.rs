//! Name catalog queries backed by the SDK's [`CatalogCache`].

use std::cell::RefCell;

use crate::catalog::CatalogCache;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{ItemType, NameEntry};

// ---------------------------------------------------------------------------
// CatalogQuery
// ---------------------------------------------------------------------------

/// Query interface for the `{name, type}` item catalog.
///
/// The catalog is fetched once and reused until [`refresh`](Self::refresh)
/// or [`invalidate`](Self::invalidate) is called.
pub struct CatalogQuery<'a> {
    client: &'a ApiClient,
    cache: &'a RefCell<CatalogCache>,
}

impl<'a> CatalogQuery<'a> {
    /// Create a new `CatalogQuery` bound to the given client and cache.
    pub fn new(client: &'a ApiClient, cache: &'a RefCell<CatalogCache>) -> Self {
        Self { client, cache }
    }

    /// Every catalog entry.
    pub fn list(&self) -> Result<Vec<NameEntry>> {
        let mut cache = self.cache.borrow_mut();
        Ok(cache.get_or_load(self.client)?.entries().to_vec())
    }

    /// Entries of one category.
    pub fn of_type(&self, item_type: ItemType) -> Result<Vec<NameEntry>> {
        let mut cache = self.cache.borrow_mut();
        Ok(cache
            .get_or_load(self.client)?
            .of_type(item_type)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Display names offered by the dashboard item picker.
    pub fn options(&self) -> Result<Vec<String>> {
        let mut cache = self.cache.borrow_mut();
        Ok(cache
            .get_or_load(self.client)?
            .options()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Look up a name in any casing.
    pub fn resolve(&self, name: &str) -> Result<Option<NameEntry>> {
        let mut cache = self.cache.borrow_mut();
        Ok(cache.get_or_load(self.client)?.resolve(name).cloned())
    }

    /// Reload the catalog now. Returns the number of entries.
    pub fn refresh(&self) -> Result<usize> {
        let mut cache = self.cache.borrow_mut();
        Ok(cache.refresh(self.client)?.len())
    }

    /// Forget the cached catalog; the next lookup reloads it.
    pub fn invalidate(&self) {
        self.cache.borrow_mut().invalidate();
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.borrow().is_loaded()
    }
}
