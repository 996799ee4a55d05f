//! # magnora_core
//!
//! Review data client for headless storefronts.
//!
//! [`ReviewClient`] serves reviews, products and the shop record through a
//! per-client TTL cache and submits new reviews; [`RatingClient`] fetches
//! product rating summaries. Page/environment signals used for shop
//! detection are read through [`PageSignals`].

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
mod http;
pub mod identity;
mod inflight;
pub mod models;
pub mod page;
pub mod query;
pub mod rating;

pub use cache::{CACHE_TTL, CacheValue, ResponseCache};
pub use client::ReviewClient;
pub use config::{ClientConfig, Environment};
pub use error::{ClientError, Operation, SignalError};
pub use identity::ShopIdentity;
pub use models::{Product, RatingSummary, Review, ReviewDraft, Shop};
pub use page::{EnvSignals, PageSignals, PageSnapshot};
pub use query::{ReviewQuery, SortBy, SortOrder};
pub use rating::{RatingClient, RatingConfig};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
