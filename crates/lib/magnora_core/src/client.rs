// @awa-component: RVW-ReviewClient
//
//! Review data client.
//!
//! Resolves the shop identity once, serves review/product/shop data through
//! the response cache, submits reviews and invalidates the review lists they
//! affect.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use tracing::{debug, error, info};
use url::Url;

use crate::cache::{self, CacheValue, ResponseCache, SHOP_KEY};
use crate::config::{ClientConfig, DEFAULT_REVIEWS_PATH, DEFAULT_SHOP_PATH};
use crate::error::{ClientError, Operation};
use crate::http;
use crate::identity::{self, ShopIdentity};
use crate::inflight::InFlight;
use crate::models::{Product, Review, ReviewDraft, Shop};
use crate::page::PageSignals;
use crate::query::ReviewQuery;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    #[serde(flatten)]
    draft: &'a ReviewDraft,
    shop_id: &'a str,
}

/// Client for the reviews API with an owned response cache.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct ReviewClient {
    config: ClientConfig,
    identity: ShopIdentity,
    init_error: Option<String>,
    signals: Arc<dyn PageSignals>,
    http: Client,
    cache: Arc<ResponseCache>,
    inflight: Arc<InFlight>,
}

impl ReviewClient {
    /// Build a client and resolve its shop identity.
    ///
    /// Signal read failures do not fail construction: the error is logged,
    /// kept in [`init_error`](Self::init_error), and the client continues
    /// with an empty identity.
    pub fn new(config: ClientConfig, signals: Arc<dyn PageSignals>) -> Self {
        let (identity, init_error) =
            match ShopIdentity::detect(config.shop_id.as_deref(), signals.as_ref()) {
                Ok(identity) => (identity, None),
                Err(e) => {
                    error!(error = %e, "failed to initialize review client");
                    (ShopIdentity::default(), Some(e.to_string()))
                }
            };

        info!(
            environment = %config.environment,
            shop_id = identity.shop_id_param(),
            hydrogen = identity.is_hydrogen_platform,
            "review client ready"
        );

        Self {
            config,
            identity,
            init_error,
            signals,
            http: Client::new(),
            cache: Arc::new(ResponseCache::new()),
            inflight: Arc::new(InFlight::new()),
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts, TLS).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Replace the cache with an empty one using `ttl`.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Arc::new(ResponseCache::with_ttl(ttl));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn identity(&self) -> &ShopIdentity {
        &self.identity
    }

    pub fn shop_id(&self) -> Option<&str> {
        self.identity.shop_id.as_deref()
    }

    pub fn is_hydrogen_platform(&self) -> bool {
        self.identity.is_hydrogen_platform
    }

    /// Message of the error captured while detecting the shop identity.
    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// List reviews for a product.
    ///
    /// Served from the cache while fresh; otherwise fetched and cached. The
    /// list is returned as the server sent it.
    pub async fn get_reviews(
        &self,
        product_id: &str,
        query: &ReviewQuery,
    ) -> Result<Vec<Review>, ClientError> {
        let key = cache::reviews_key(product_id, query);
        self.load(key, || {
            let url = self.config.endpoint(DEFAULT_REVIEWS_PATH)?;
            let mut params = vec![
                ("productId", product_id.to_string()),
                ("shopId", self.identity.shop_id_param().to_string()),
            ];
            params.extend(query.query_pairs());
            let request = self.request(Method::GET, url).query(&params);
            Ok(http::send_json::<Vec<Review>>(request, Operation::FetchReviews))
        })
        .await
        .inspect_err(|e| error!(product_id, error = %e, "error fetching reviews"))
    }

    /// Fetch a product record.
    pub async fn get_product(&self, product_id: &str) -> Result<Product, ClientError> {
        let key = cache::product_key(product_id);
        self.load(key, || {
            let url = self.config.product_endpoint(product_id)?;
            let request = self.shop_scoped(url);
            Ok(http::send_json::<Product>(request, Operation::FetchProduct))
        })
        .await
        .inspect_err(|e| error!(product_id, error = %e, "error fetching product"))
    }

    /// Fetch the shop record.
    pub async fn get_shop(&self) -> Result<Shop, ClientError> {
        self.load(SHOP_KEY.to_string(), || {
            let url = self.config.endpoint(DEFAULT_SHOP_PATH)?;
            let request = self.shop_scoped(url);
            Ok(http::send_json::<Shop>(request, Operation::FetchShop))
        })
        .await
        .inspect_err(|e| error!(error = %e, "error fetching shop info"))
    }

    /// Submit a review and drop the cached review lists of its product.
    ///
    /// Product and shop records stay cached; their aggregates are refreshed
    /// server-side.
    pub async fn submit_review(&self, draft: &ReviewDraft) -> Result<Review, ClientError> {
        self.submit(draft).await.inspect_err(|e| {
            error!(product_id = ?draft.product_id, error = %e, "error submitting review")
        })
    }

    async fn submit(&self, draft: &ReviewDraft) -> Result<Review, ClientError> {
        let url = self.config.endpoint(DEFAULT_REVIEWS_PATH)?;
        let body = SubmitBody {
            draft,
            shop_id: self.identity.shop_id_param(),
        };
        let request = self.request(Method::POST, url).json(&body);
        let review: Review = http::send_json(request, Operation::SubmitReview).await?;

        if let Some(product_id) = draft.product_id.as_deref() {
            self.invalidate_reviews(product_id);
        }
        Ok(review)
    }

    /// Drop every cached review list of a product and fetch the default list.
    pub async fn refresh_reviews(&self, product_id: &str) -> Result<(), ClientError> {
        self.invalidate_reviews(product_id);
        self.get_reviews(product_id, &ReviewQuery::default())
            .await
            .map(|_| ())
    }

    /// Drop every cached review list of a product. Returns the count removed.
    pub fn invalidate_reviews(&self, product_id: &str) -> usize {
        let prefix = cache::reviews_prefix(product_id);
        self.inflight.forget_prefix(&prefix);
        let removed = self.cache.invalidate_prefix(&prefix);
        debug!(product_id, removed, "invalidated cached reviews");
        removed
    }

    /// Drop the whole cache.
    pub fn clear_cache(&self) {
        self.inflight.clear();
        self.cache.clear();
        debug!("cache cleared");
    }

    /// Drop every expired cache entry. Returns the count removed.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    /// Purge expired entries every `period` on a background task.
    pub fn spawn_cleanup_task(&self, period: Duration) -> tokio::task::JoinHandle<()> {
        self.cache.spawn_cleanup_task(period)
    }

    /// Product id of the current page, if the page exposes one.
    pub fn current_product_id(&self) -> Result<Option<String>, ClientError> {
        identity::current_product_id(self.signals.as_ref())
            .map_err(ClientError::from)
            .inspect_err(|e| error!(error = %e, "error reading current product id"))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        http::json_request(&self.http, method, url, self.config.api_key.as_deref())
    }

    fn shop_scoped(&self, url: Url) -> RequestBuilder {
        self.request(Method::GET, url)
            .query(&[("shopId", self.identity.shop_id_param())])
    }

    /// Serve `key` from the cache, or run the fetch built by `make_fetch`.
    ///
    /// Concurrent misses on the same key share one fetch; its result is
    /// cached once.
    async fn load<T, F, Fut>(&self, key: String, make_fetch: F) -> Result<T, ClientError>
    where
        T: Into<CacheValue> + TryFrom<CacheValue, Error = CacheValue>,
        F: FnOnce() -> Result<Fut, ClientError>,
        Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            return T::try_from(hit).map_err(|_| ClientError::CacheMismatch(key));
        }
        debug!(key = %key, "cache miss");

        let fetch = make_fetch()?;
        let cache = Arc::clone(&self.cache);
        let cache_key = key.clone();
        let shared = self.inflight.join_or_start(
            &key,
            async move { fetch.await.map(Into::into) },
            move |value: &CacheValue| cache.insert(cache_key, value.clone()),
        );

        let value = shared.await?;
        T::try_from(value).map_err(|_| ClientError::CacheMismatch(key))
    }
}
