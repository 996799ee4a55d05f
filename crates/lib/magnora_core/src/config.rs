// @awa-component: RVW-ClientConfig
//
//! Client configuration and endpoint resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ClientError;

/// Default page origin relative API paths resolve against.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

pub const DEFAULT_REVIEWS_PATH: &str = "/api/reviews";
pub const DEFAULT_PRODUCTS_PATH: &str = "/api/products";
pub const DEFAULT_SHOP_PATH: &str = "/api/shop";
pub const RATING_PATH: &str = "/api/shopify/reviews";

/// Deployment environment tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(Environment::Production),
            "development" => Ok(Environment::Development),
            other => Err(ClientError::InvalidOption(format!(
                "unknown environment '{other}' (expected production or development)"
            ))),
        }
    }
}

/// Configuration for [`crate::ReviewClient`]. Fixed for the client's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Explicit shop id; takes priority over anything detected on the page.
    pub shop_id: Option<String>,
    /// API endpoint used for every operation instead of the default paths.
    /// May be relative to `origin` or absolute.
    pub api_url: Option<String>,
    /// Sent as `Authorization: Bearer {api_key}` when set.
    pub api_key: Option<String>,
    pub environment: Environment,
    /// Page origin relative paths resolve against.
    pub origin: Url,
}

impl ClientConfig {
    /// Config with every optional field unset.
    pub fn new(origin: Url) -> Self {
        Self {
            shop_id: None,
            api_url: None,
            api_key: None,
            environment: Environment::default(),
            origin,
        }
    }

    pub fn with_shop_id(mut self, shop_id: impl Into<String>) -> Self {
        self.shop_id = Some(shop_id.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Endpoint for an operation: `api_url` when set, else `default_path`,
    /// resolved against `origin`.
    pub fn endpoint(&self, default_path: &str) -> Result<Url, ClientError> {
        let path = self
            .api_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(default_path);
        Ok(self.origin.join(path)?)
    }

    /// `{endpoint}/{product_id}` with the id percent-encoded as one segment.
    pub fn product_endpoint(&self, product_id: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint(DEFAULT_PRODUCTS_PATH)?;
        let base = url.to_string();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("API URL cannot take a path: {base}")))?
            .pop_if_empty()
            .push(product_id);
        Ok(url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_ORIGIN).expect("DEFAULT_ORIGIN is a valid URL"))
    }
}
