// @awa-component: RVW-RatingClient
//
//! Rating summary provider.
//!
//! Fetches the average rating and review count of a product from the
//! storefront's rating endpoint. Requires an API key; the client cannot be
//! built without one.

use reqwest::{Client, Method};
use tracing::error;
use url::Url;

use crate::config::{DEFAULT_ORIGIN, RATING_PATH};
use crate::error::{ClientError, Operation};
use crate::http;
use crate::models::RatingSummary;

/// Configuration for [`RatingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingConfig {
    pub api_key: String,
    pub shop_domain: Option<String>,
    /// Page origin the rating path resolves against.
    pub origin: Url,
}

impl RatingConfig {
    pub fn new(api_key: impl Into<String>, origin: Url) -> Self {
        Self {
            api_key: api_key.into(),
            shop_domain: None,
            origin,
        }
    }

    pub fn with_shop_domain(mut self, shop_domain: impl Into<String>) -> Self {
        self.shop_domain = Some(shop_domain.into());
        self
    }
}

/// Client for the rating endpoint.
#[derive(Debug, Clone)]
pub struct RatingClient {
    config: RatingConfig,
    endpoint: Url,
    http: Client,
}

impl RatingClient {
    pub fn new(config: RatingConfig) -> Result<Self, ClientError> {
        if config.api_key.is_empty() {
            return Err(ClientError::Config(
                "an API key is required for the rating client".to_string(),
            ));
        }
        let endpoint = config.origin.join(RATING_PATH)?;
        Ok(Self {
            config,
            endpoint,
            http: Client::new(),
        })
    }

    /// Rating client for the default origin.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(RatingConfig::new(api_key, Url::parse(DEFAULT_ORIGIN)?))
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    pub fn shop_domain(&self) -> Option<&str> {
        self.config.shop_domain.as_deref()
    }

    /// Fetch the rating summary of a product. Not cached.
    pub async fn get_rating(&self, product_id: &str) -> Result<RatingSummary, ClientError> {
        let request = self
            .http
            .request(Method::GET, self.endpoint.clone())
            .query(&[("productId", product_id)]);
        let request = http::with_bearer(request, Some(&self.config.api_key));

        http::send_json(request, Operation::FetchRating)
            .await
            .inspect_err(|e| error!(product_id, error = %e, "error fetching rating"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected_at_construction() {
        let err = RatingClient::with_api_key("").unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn exposes_configured_values() {
        let config = RatingConfig::new("test-api-key", Url::parse("https://shop.example").unwrap())
            .with_shop_domain("test-shop.myshopify.com");
        let client = RatingClient::new(config).unwrap();
        assert_eq!(client.api_key(), "test-api-key");
        assert_eq!(client.shop_domain(), Some("test-shop.myshopify.com"));
    }

    #[test]
    fn shop_domain_is_optional() {
        let client = RatingClient::with_api_key("test-api-key").unwrap();
        assert!(client.shop_domain().is_none());
    }
}
