// @awa-component: RVW-PageSignals
//
//! Page signals: the storefront environment the client runs in.
//!
//! A storefront exposes its identity through platform globals, `<meta>`
//! tags, element attributes and the page hostname. [`PageSignals`] reads
//! those; [`PageSnapshot`] holds them in memory and [`EnvSignals`] maps them
//! onto `MAGNORA_*` environment variables.

use std::collections::{HashMap, HashSet};
use std::env;

use crate::error::SignalError;

/// Read-only access to the signals of the current page.
pub trait PageSignals: Send + Sync {
    /// Shop identifier exposed by the platform global (`Shopify.shop`).
    fn platform_shop(&self) -> Result<Option<String>, SignalError>;

    /// Whether the platform global flag `name` is set.
    fn has_global(&self, name: &str) -> Result<bool, SignalError>;

    /// Content of the `<meta name="{name}">` tag.
    fn meta(&self, name: &str) -> Result<Option<String>, SignalError>;

    /// Value of the first element attribute called `name`.
    fn attribute(&self, name: &str) -> Result<Option<String>, SignalError>;

    /// Hostname of the current page.
    fn hostname(&self) -> Result<Option<String>, SignalError>;
}

/// In-memory page signals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    platform_shop: Option<String>,
    globals: HashSet<String>,
    meta: HashMap<String, String>,
    attributes: HashMap<String, String>,
    hostname: Option<String>,
}

impl PageSnapshot {
    /// A page with no signals at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_platform_shop(mut self, shop: impl Into<String>) -> Self {
        self.platform_shop = Some(shop.into());
        self
    }

    pub fn with_global(mut self, name: impl Into<String>) -> Self {
        self.globals.insert(name.into());
        self
    }

    pub fn with_meta(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.meta.insert(name.into(), content.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }
}

impl PageSignals for PageSnapshot {
    fn platform_shop(&self) -> Result<Option<String>, SignalError> {
        Ok(self.platform_shop.clone())
    }

    fn has_global(&self, name: &str) -> Result<bool, SignalError> {
        Ok(self.globals.contains(name))
    }

    fn meta(&self, name: &str) -> Result<Option<String>, SignalError> {
        Ok(self.meta.get(name).cloned())
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, SignalError> {
        Ok(self.attributes.get(name).cloned())
    }

    fn hostname(&self) -> Result<Option<String>, SignalError> {
        Ok(self.hostname.clone())
    }
}

const ENV_PREFIX: &str = "MAGNORA_";

/// Page signals read from `MAGNORA_*` environment variables.
///
/// | Signal | Variable |
/// |---|---|
/// | platform shop | `MAGNORA_SHOPIFY_SHOP` |
/// | global `__HYDROGEN__` | `MAGNORA_HYDROGEN` |
/// | meta `shopify-shop-id` | `MAGNORA_SHOPIFY_SHOP_ID` |
/// | attribute `data-product-id` | `MAGNORA_DATA_PRODUCT_ID` |
/// | hostname | `MAGNORA_HOSTNAME` |
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSignals;

impl EnvSignals {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable name for a signal name.
    pub fn var_name(signal: &str) -> String {
        format!(
            "{ENV_PREFIX}{}",
            signal.trim_matches('_').to_uppercase().replace('-', "_")
        )
    }

    fn read(signal: &str) -> Result<Option<String>, SignalError> {
        let name = Self::var_name(signal);
        match env::var(&name) {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(SignalError(format!(
                "environment variable {name} is not valid unicode"
            ))),
        }
    }
}

impl PageSignals for EnvSignals {
    fn platform_shop(&self) -> Result<Option<String>, SignalError> {
        Self::read("shopify-shop")
    }

    fn has_global(&self, name: &str) -> Result<bool, SignalError> {
        Ok(Self::read(name)?.is_some())
    }

    fn meta(&self, name: &str) -> Result<Option<String>, SignalError> {
        Self::read(name)
    }

    fn attribute(&self, name: &str) -> Result<Option<String>, SignalError> {
        Self::read(name)
    }

    fn hostname(&self) -> Result<Option<String>, SignalError> {
        Self::read("hostname")
    }
}
