//! Query modules for the ROM Exchange SDK.
//!
//! Each module provides a query struct that borrows from the SDK's
//! [`ApiClient`](crate::client::ApiClient) (and, where names are involved, its
//! [`CatalogCache`](crate::catalog::CatalogCache)) and exposes methods
//! returning `Result<T>` with typed payloads.

pub mod catalog;
pub mod dashboard;
pub mod items;

pub use catalog::CatalogQuery;
pub use dashboard::DashboardQuery;
pub use items::{ItemQuery, SearchItemsParams};
