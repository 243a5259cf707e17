//! ROM Exchange SDK for Rust.
//!
//! Provides a high-level client for the ROM Exchange price history API:
//! paginated item search with one page of look-ahead, shareable dashboard
//! links, the item name catalog, and chart-ready price series. Data comes
//! from the public HTTP API or from local fixture files.
//!
//! # Quick start
//!
//! ```no_run
//! use rom_exchange_sdk::RomExchangeSdk;
//!
//! let sdk = RomExchangeSdk::builder().build().unwrap();
//!
//! // Browse the biggest weekly movers, merging the next page on scroll
//! let mut feed = sdk.feed();
//! feed.start();
//! sdk.run_feed(&mut feed);
//! feed.on_scroll_near_end();
//! sdk.run_feed(&mut feed);
//!
//! // Share a dashboard
//! let link = sdk.dashboard().create(&["Red Potion", "Apple"]).unwrap();
//! println!("{}", link.url);
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod catalog;
pub mod chart;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod fixture;
pub mod location;
pub mod models;
pub mod queries;
pub mod url_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncRomExchangeSdk;
pub use catalog::{Catalog, CatalogCache};
pub use client::{ApiClient, Endpoint, PriceSource};
pub use dashboard::{DashboardCodec, DashboardSelection, EncodedDashboard, SelectedItem};
pub use error::{RomExchangeError, Result};
pub use feed::{Feed, FeedEvent, FetchRequest, FetchToken};
pub use url_builder::UrlBuilder;

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use models::QueryOptions;

// ---------------------------------------------------------------------------
// RomExchangeSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`RomExchangeSdk`] instance.
///
/// Use [`RomExchangeSdk::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](RomExchangeSdkBuilder::build) to create the SDK.
pub struct RomExchangeSdkBuilder {
    base_url: String,
    fixtures: Option<PathBuf>,
    timeout: Duration,
    origin: Option<String>,
    max_url_len: usize,
}

impl Default for RomExchangeSdkBuilder {
    fn default() -> Self {
        Self {
            base_url: config::DEFAULT_BASE_URL.to_string(),
            fixtures: None,
            timeout: config::DEFAULT_TIMEOUT,
            origin: None,
            max_url_len: config::MAX_URL_LEN,
        }
    }
}

impl RomExchangeSdkBuilder {
    /// Set the API base URL. Defaults to `https://www.romexchange.com`.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Answer every query from fixture files in `dir` instead of the network.
    ///
    /// The directory must contain `mockdata.json` (an array of items) and may
    /// contain `items.json` (the name catalog). Either may be gzipped.
    pub fn fixtures<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.fixtures = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the HTTP request timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Origin used in dashboard links. Defaults to the base URL.
    pub fn origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    /// Maximum dashboard link length. Defaults to 2000 characters.
    pub fn max_url_len(mut self, len: usize) -> Self {
        self.max_url_len = len;
        self
    }

    /// Build the SDK.
    ///
    /// Fixture files are loaded here; the remote API is not contacted until
    /// the first query.
    pub fn build(self) -> Result<RomExchangeSdk> {
        let endpoint = match self.fixtures {
            Some(dir) => Endpoint::Fixtures { dir },
            None => Endpoint::Remote {
                base_url: self.base_url.clone(),
            },
        };
        let client = ApiClient::new(endpoint, self.timeout)?;
        let origin = self.origin.unwrap_or(self.base_url);
        let codec = DashboardCodec::new(&origin, self.max_url_len)?;
        Ok(RomExchangeSdk {
            client,
            catalog: RefCell::new(CatalogCache::new()),
            codec,
        })
    }
}

// ---------------------------------------------------------------------------
// RomExchangeSdk
// ---------------------------------------------------------------------------

/// The main entry point for the ROM Exchange SDK.
///
/// Owns the [`ApiClient`], the [`CatalogCache`] and the [`DashboardCodec`],
/// and exposes domain-specific query interfaces as lightweight borrowing
/// wrappers.
///
/// Created via [`RomExchangeSdk::builder()`].
pub struct RomExchangeSdk {
    client: ApiClient,
    catalog: RefCell<CatalogCache>,
    codec: DashboardCodec,
}

impl RomExchangeSdk {
    /// Create a new builder for configuring the SDK.
    pub fn builder() -> RomExchangeSdkBuilder {
        RomExchangeSdkBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the item query interface.
    pub fn items(&self) -> queries::items::ItemQuery<'_> {
        queries::items::ItemQuery::new(&self.client)
    }

    /// Access the name catalog query interface.
    pub fn catalog(&self) -> queries::catalog::CatalogQuery<'_> {
        queries::catalog::CatalogQuery::new(&self.client, &self.catalog)
    }

    /// Access the dashboard link interface.
    ///
    /// Decoding loads the name catalog on first use.
    pub fn dashboard(&self) -> queries::dashboard::DashboardQuery<'_> {
        queries::dashboard::DashboardQuery::new(&self.client, &self.catalog, &self.codec)
    }

    // -- Feed --------------------------------------------------------------

    /// A new idle feed for the landing query.
    pub fn feed(&self) -> Feed {
        Feed::new(QueryOptions::default())
    }

    /// A new idle feed for `query`.
    pub fn feed_for(&self, query: QueryOptions) -> Feed {
        Feed::new(query)
    }

    /// Perform every fetch `feed` has queued, blocking on each.
    pub fn run_feed(&self, feed: &mut Feed) -> Vec<FeedEvent> {
        feed.run_blocking(&self.client)
    }

    // -- Utility methods ---------------------------------------------------

    /// Drop and reload the cached name catalog.
    ///
    /// Returns the number of catalog entries after the reload.
    pub fn refresh(&self) -> Result<usize> {
        let mut cache = self.catalog.borrow_mut();
        cache.invalidate();
        let count = cache.refresh(&self.client)?.len();
        tracing::info!(count, "catalog reloaded");
        Ok(count)
    }

    /// The dashboard codec in use.
    pub fn codec(&self) -> &DashboardCodec {
        &self.codec
    }

    /// Return a reference to the underlying [`ApiClient`] for advanced usage.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for RomExchangeSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoint = match &self.client.endpoint {
            Endpoint::Remote { base_url } => base_url.clone(),
            Endpoint::Fixtures { dir } => format!("fixtures:{}", dir.display()),
        };
        write!(
            f,
            "RomExchangeSdk(endpoint={}, catalog_loaded={}, max_url_len={})",
            endpoint,
            self.catalog.borrow().is_loaded(),
            self.codec.max_len()
        )
    }
}
