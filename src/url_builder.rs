//! Request URL builder for the price API.
//!
//! Every value goes through `url`'s form encoder, never through string
//! formatting. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use rom_exchange_sdk::UrlBuilder;
//! let url = UrlBuilder::new("https://www.romexchange.com", "/api")
//!     .param("item", "Red Potion")
//!     .param("page", 2)
//!     .build()
//!     .unwrap();
//! assert_eq!(url.as_str(), "https://www.romexchange.com/api?item=Red+Potion&page=2");
//! ```

use std::fmt::Display;

use url::Url;

use crate::error::Result;
use crate::models::QueryOptions;

/// Builds request URLs with form-encoded query parameters.
pub struct UrlBuilder {
    base: String,
    path: String,
    params: Vec<(String, String)>,
}

impl UrlBuilder {
    /// Create a builder for `path` under `base`.
    pub fn new(base: &str, path: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            path: path.to_string(),
            params: Vec::new(),
        }
    }

    /// Builder preloaded with every `/api` parameter of `query`.
    pub fn for_query(base: &str, path: &str, query: &QueryOptions) -> Self {
        let mut builder = Self::new(base, path);
        builder
            .param("item", &query.item)
            .param("exact", query.exact)
            .param("type", query.item_type.0)
            .param("page", query.page)
            .param("sort", query.sort.sort)
            .param("sort_dir", query.sort.direction)
            .param("sort_server", query.sort.server)
            .param("sort_range", query.sort.range);
        builder
    }

    /// Append a `key=value` pair.
    pub fn param(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.params.push((key.to_string(), value.to_string()));
        self
    }

    /// Parameters collected so far, in insertion order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Assemble the final URL.
    pub fn build(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base, self.path))?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        Ok(url)
    }
}
