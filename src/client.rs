//! Data sources for item price history and the name catalog.
//!
//! [`PriceSource`] is the seam between the pagination controller and the
//! outside world. [`ApiClient`] implements it either against the remote HTTP
//! API or against local fixture files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;

use crate::config;
use crate::error::Result;
use crate::fixture::FixtureStore;
use crate::models::{Item, NameEntry, QueryOptions};
use crate::url_builder::UrlBuilder;

/// Anything able to answer item-page and name-catalog requests.
pub trait PriceSource {
    /// Fetch one page of items for `query`.
    fn fetch_items(&self, query: &QueryOptions) -> Result<Vec<Item>>;

    /// Fetch the full `{name, type}` catalog.
    fn fetch_names(&self) -> Result<Vec<NameEntry>>;
}

/// Where an [`ApiClient`] reads its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Remote HTTP API rooted at `base_url`.
    Remote { base_url: String },
    /// Directory holding `mockdata.json` and `items.json`.
    Fixtures { dir: PathBuf },
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Remote {
            base_url: config::DEFAULT_BASE_URL.to_string(),
        }
    }
}

enum Backend {
    Http { base_url: String, client: Client },
    Fixtures(FixtureStore),
}

/// Blocking client for the price API.
pub struct ApiClient {
    /// The endpoint this client was built for.
    pub endpoint: Endpoint,
    backend: Backend,
}

impl ApiClient {
    /// Create a client for `endpoint`.
    ///
    /// Remote endpoints build an HTTP client with `timeout`; fixture endpoints
    /// load their files eagerly.
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self> {
        let backend = match &endpoint {
            Endpoint::Remote { base_url } => Backend::Http {
                base_url: base_url.trim_end_matches('/').to_string(),
                client: Client::builder()
                    .timeout(timeout)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()?,
            },
            Endpoint::Fixtures { dir } => Backend::Fixtures(FixtureStore::load(dir)?),
        };
        Ok(Self { endpoint, backend })
    }

    /// Client backed by the remote API at `base_url`.
    pub fn remote(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::new(
            Endpoint::Remote {
                base_url: base_url.to_string(),
            },
            timeout,
        )
    }

    /// Client backed by fixture files in `dir`.
    pub fn fixtures<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::new(
            Endpoint::Fixtures {
                dir: dir.as_ref().to_path_buf(),
            },
            config::DEFAULT_TIMEOUT,
        )
    }

    /// True when answering from local fixtures.
    pub fn is_offline(&self) -> bool {
        matches!(self.backend, Backend::Fixtures(_))
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        client: &Client,
        builder: &UrlBuilder,
    ) -> Result<T> {
        let url = builder.build()?;
        tracing::debug!(%url, "GET");
        let resp = client.get(url).send()?.error_for_status()?;
        Ok(resp.json()?)
    }
}

impl PriceSource for ApiClient {
    fn fetch_items(&self, query: &QueryOptions) -> Result<Vec<Item>> {
        let items: Vec<Item> = match &self.backend {
            Backend::Http { base_url, client } => {
                let builder = UrlBuilder::for_query(base_url, config::API_PATH, query);
                Self::get_json(client, &builder)?
            }
            Backend::Fixtures(store) => store.query(query),
        };
        tracing::debug!(page = query.page, count = items.len(), "fetched items");
        Ok(items.into_iter().map(Item::normalized).collect())
    }

    fn fetch_names(&self) -> Result<Vec<NameEntry>> {
        match &self.backend {
            Backend::Http { base_url, client } => {
                let builder = UrlBuilder::new(base_url, config::NAMES_PATH);
                Self::get_json(client, &builder)
            }
            Backend::Fixtures(store) => Ok(store.names().to_vec()),
        }
    }
}
