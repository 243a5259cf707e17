//! Async wrapper around [`RomExchangeSdk`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free. The
//! [`Feed`](crate::feed::Feed) controller stays on the caller's task: drain
//! its requests, hand each to [`fetch`](AsyncRomExchangeSdk::fetch), and feed
//! the result back with `on_response`. Responses may complete in any order;
//! the feed discards the stale ones.
//!
//! # Example
//!
//! ```no_run
//! use rom_exchange_sdk::{AsyncRomExchangeSdk, Feed};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = AsyncRomExchangeSdk::builder().build().await.unwrap();
//!
//!     let mut feed = Feed::default();
//!     feed.start();
//!     while let Some(request) = feed.next_request() {
//!         let (token, result) = sdk.fetch(request).await;
//!         feed.on_response(token, result);
//!     }
//!
//!     // Run any sync SDK method via closure
//!     let names = sdk.run(|s| s.catalog().options()).await.unwrap();
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::PriceSource;
use crate::config;
use crate::error::{RomExchangeError, Result};
use crate::feed::{FetchRequest, FetchToken};
use crate::models::Item;
use crate::RomExchangeSdk;

// ---------------------------------------------------------------------------
// AsyncRomExchangeSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncRomExchangeSdk`] instance.
pub struct AsyncRomExchangeSdkBuilder {
    base_url: String,
    fixtures: Option<PathBuf>,
    timeout: Duration,
    origin: Option<String>,
    max_url_len: usize,
}

impl Default for AsyncRomExchangeSdkBuilder {
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

impl AsyncRomExchangeSdkBuilder {
    /// Set the API base URL.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Answer every query from fixture files in `dir`.
    pub fn fixtures<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.fixtures = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Origin used in dashboard links.
    pub fn origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.to_string());
        self
    }

    /// Maximum dashboard link length.
    pub fn max_url_len(mut self, len: usize) -> Self {
        self.max_url_len = len;
        self
    }

    /// Build the async SDK.
    ///
    /// Initialization runs on the blocking thread pool so it won't block
    /// the async event loop.
    pub async fn build(self) -> Result<AsyncRomExchangeSdk> {
        tokio::task::spawn_blocking(move || {
            let mut builder = RomExchangeSdk::builder()
                .base_url(&self.base_url)
                .timeout(self.timeout)
                .max_url_len(self.max_url_len);
            if let Some(dir) = self.fixtures {
                builder = builder.fixtures(dir);
            }
            if let Some(origin) = self.origin {
                builder = builder.origin(&origin);
            }
            let sdk = builder.build()?;
            Ok(AsyncRomExchangeSdk {
                inner: Arc::new(Mutex::new(sdk)),
            })
        })
        .await
        .map_err(|e| RomExchangeError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncRomExchangeSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`RomExchangeSdk`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. The underlying [`RomExchangeSdk`] is
/// protected by a [`Mutex`] since it uses `RefCell` internally.
pub struct AsyncRomExchangeSdk {
    inner: Arc<Mutex<RomExchangeSdk>>,
}

impl AsyncRomExchangeSdk {
    /// Create a new builder for configuring the async SDK.
    pub fn builder() -> AsyncRomExchangeSdkBuilder {
        AsyncRomExchangeSdkBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives an `&RomExchangeSdk` reference and should return
    /// a `Result<T>`.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&RomExchangeSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = sdk
                .lock()
                .map_err(|_| RomExchangeError::InvalidArgument("SDK lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| RomExchangeError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Perform one feed request, returning its token alongside the result so
    /// it can be handed straight to `Feed::on_response`.
    pub async fn fetch(&self, request: FetchRequest) -> (FetchToken, Result<Vec<Item>>) {
        let token = request.token;
        let result = self
            .run(move |s| s.client().fetch_items(&request.query))
            .await;
        (token, result)
    }

    /// Drop and reload the name catalog.
    pub async fn refresh(&self) -> Result<usize> {
        self.run(|s| s.refresh()).await
    }
}
