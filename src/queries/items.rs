//! Item price-history queries against the `/api` endpoint.

use crate::chart::ChartData;
use crate::client::{ApiClient, PriceSource};
use crate::error::Result;
use crate::models::{Item, ItemType, QueryOptions, Range, Server, SortOptions};

// ---------------------------------------------------------------------------
// SearchItemsParams
// ---------------------------------------------------------------------------

/// Parameters for a one-shot item search.
///
/// All fields are optional. When `None`, the API default is used.
#[derive(Debug, Clone, Default)]
pub struct SearchItemsParams {
    pub name: Option<String>,
    pub exact: Option<bool>,
    pub item_type: Option<ItemType>,
    pub sort: Option<SortOptions>,
    pub page: Option<u32>,
}

impl SearchItemsParams {
    /// Resolve into a full query, filling gaps with defaults.
    pub fn into_query(self) -> QueryOptions {
        let defaults = QueryOptions::default();
        QueryOptions {
            item: self.name.unwrap_or(defaults.item),
            exact: self.exact.unwrap_or(defaults.exact),
            item_type: self.item_type.unwrap_or(defaults.item_type),
            sort: self.sort.unwrap_or(defaults.sort),
            page: self.page.unwrap_or(defaults.page).max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// ItemQuery
// ---------------------------------------------------------------------------

/// Query interface for item price history.
pub struct ItemQuery<'a> {
    client: &'a ApiClient,
}

impl<'a> ItemQuery<'a> {
    /// Create a new `ItemQuery` bound to the given client.
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Fetch one page for a fully specified query.
    pub fn page(&self, query: &QueryOptions) -> Result<Vec<Item>> {
        self.client.fetch_items(query)
    }

    /// Search with optional parameters.
    pub fn search(&self, params: SearchItemsParams) -> Result<Vec<Item>> {
        self.page(&params.into_query())
    }

    /// Fetch a single item by its exact name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Result<Option<Item>> {
        let query = QueryOptions {
            item: name.to_string(),
            exact: true,
            ..QueryOptions::default()
        };
        let wanted = name.trim().to_lowercase();
        Ok(self
            .page(&query)?
            .into_iter()
            .find(|i| i.name.to_lowercase() == wanted))
    }

    /// Chart data for the named item, or `None` if it does not exist.
    pub fn chart(&self, name: &str, range: Range, server: Server) -> Result<Option<ChartData>> {
        Ok(self
            .get_by_name(name)?
            .map(|item| ChartData::build(&item, range, server)))
    }
}
