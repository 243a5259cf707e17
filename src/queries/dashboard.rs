//! Dashboard link queries: build shareable links from catalog names and
//! resolve links back into items.

use std::cell::RefCell;

use crate::catalog::CatalogCache;
use crate::client::ApiClient;
use crate::dashboard::{DashboardCodec, DashboardSelection, EncodedDashboard, SelectedItem};
use crate::error::Result;
use crate::models::Item;
use crate::queries::items::ItemQuery;

// ---------------------------------------------------------------------------
// DashboardQuery
// ---------------------------------------------------------------------------

/// Query interface for dashboard links.
pub struct DashboardQuery<'a> {
    client: &'a ApiClient,
    cache: &'a RefCell<CatalogCache>,
    codec: &'a DashboardCodec,
}

impl<'a> DashboardQuery<'a> {
    /// Create a new `DashboardQuery` bound to the given client, catalog cache and codec.
    pub fn new(
        client: &'a ApiClient,
        cache: &'a RefCell<CatalogCache>,
        codec: &'a DashboardCodec,
    ) -> Self {
        Self {
            client,
            cache,
            codec,
        }
    }

    /// Encode a selection as-is.
    pub fn encode(&self, selection: &DashboardSelection) -> EncodedDashboard {
        self.codec.encode_selection(selection)
    }

    /// Build a link from names, keeping only those in the catalog (in their
    /// catalog spelling).
    pub fn create(&self, names: &[&str]) -> Result<EncodedDashboard> {
        let mut cache = self.cache.borrow_mut();
        let catalog = cache.get_or_load(self.client)?;
        let selection: DashboardSelection = names
            .iter()
            .filter_map(|n| catalog.resolve(n))
            .map(|e| e.name.clone())
            .collect();
        Ok(self.codec.encode_selection(&selection))
    }

    /// Decode a raw `q` value against the catalog.
    pub fn decode(&self, raw: &str) -> Result<Vec<SelectedItem>> {
        let mut cache = self.cache.borrow_mut();
        let catalog = cache.get_or_load(self.client)?;
        Ok(self.codec.decode(raw, catalog))
    }

    /// Decode the `q` parameter of a full dashboard URL.
    pub fn decode_url(&self, url: &str) -> Result<Vec<SelectedItem>> {
        let mut cache = self.cache.borrow_mut();
        let catalog = cache.get_or_load(self.client)?;
        Ok(self.codec.decode_url(url, catalog))
    }

    /// Fetch price history for every item in a raw `q` value, in link order.
    ///
    /// Names the API no longer returns are skipped.
    pub fn items(&self, raw: &str) -> Result<Vec<Item>> {
        let selected = self.decode(raw)?;
        let items = ItemQuery::new(self.client);
        let mut out = Vec::with_capacity(selected.len());
        for entry in &selected {
            match items.get_by_name(&entry.label)? {
                Some(item) => out.push(item),
                None => tracing::debug!(name = %entry.label, "dashboard item not returned by API"),
            }
        }
        Ok(out)
    }
}
