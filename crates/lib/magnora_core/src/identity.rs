// @awa-component: RVW-ShopIdentity
//
//! Shop identity detection.
//!
//! Resolves which shop the client talks for, and whether it runs inside a
//! Hydrogen storefront, from the configured shop id and the page signals.

use serde::Serialize;
use tracing::warn;

use crate::error::SignalError;
use crate::page::PageSignals;

/// Platform global flags that mark a Hydrogen runtime.
pub const PLATFORM_GLOBALS: [&str; 3] = ["__HYDROGEN__", "__HYDROGEN_DEV__", "__HYDROGEN_SERVER__"];

/// Meta tags carrying the shop id, in lookup order.
pub const SHOP_ID_META: [&str; 2] = ["shopify-shop-id", "hydrogen-shop-id"];

/// Meta tag carrying the current product id.
pub const PRODUCT_ID_META: &str = "shopify-product-id";

/// Element attribute carrying the current product id.
pub const PRODUCT_ID_ATTRIBUTE: &str = "data-product-id";

const MYSHOPIFY_DOMAIN: &str = ".myshopify.com";

/// Resolved shop identity. Computed once when a client is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopIdentity {
    pub is_hydrogen_platform: bool,
    pub shop_id: Option<String>,
}

impl ShopIdentity {
    /// Detect the platform and resolve the shop id.
    ///
    /// Priority: `configured` (when non-empty) → platform global → meta tags
    /// → `*.myshopify.com` hostname → none. A missing shop id outside a
    /// Hydrogen storefront is logged as a warning, not returned as an error.
    pub fn detect(
        configured: Option<&str>,
        signals: &dyn PageSignals,
    ) -> Result<Self, SignalError> {
        let is_hydrogen_platform = detect_platform(signals)?;

        let shop_id = match configured.filter(|id| !id.is_empty()) {
            Some(id) => Some(id.to_string()),
            None => extract_shop_id(signals)?,
        };

        if shop_id.is_none() && !is_hydrogen_platform {
            warn!(
                "no shop ID detected; configure a shop ID for non-Hydrogen stores (requests will send an empty shopId)"
            );
        }

        Ok(Self {
            is_hydrogen_platform,
            shop_id,
        })
    }

    /// Shop id as sent on the wire; empty when unresolved.
    pub fn shop_id_param(&self) -> &str {
        self.shop_id.as_deref().unwrap_or_default()
    }
}

fn detect_platform(signals: &dyn PageSignals) -> Result<bool, SignalError> {
    if signals.platform_shop()?.is_some() {
        return Ok(true);
    }
    for name in PLATFORM_GLOBALS {
        if signals.has_global(name)? {
            return Ok(true);
        }
    }
    for name in SHOP_ID_META {
        if signals.meta(name)?.is_some() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn extract_shop_id(signals: &dyn PageSignals) -> Result<Option<String>, SignalError> {
    if let Some(shop) = signals.platform_shop()? {
        return Ok(Some(shop));
    }
    for name in SHOP_ID_META {
        if let Some(content) = signals.meta(name)? {
            return Ok(Some(content));
        }
    }
    Ok(signals.hostname()?.and_then(|host| shop_from_hostname(&host)))
}

/// `acme.myshopify.com` → `acme.myshopify.com`; other hosts → none.
fn shop_from_hostname(hostname: &str) -> Option<String> {
    if !hostname.contains(MYSHOPIFY_DOMAIN) {
        return None;
    }
    let subdomain = hostname.split('.').next()?;
    Some(format!("{subdomain}{MYSHOPIFY_DOMAIN}"))
}

/// Product id of the current page: meta tag first, then element attribute.
pub fn current_product_id(signals: &dyn PageSignals) -> Result<Option<String>, SignalError> {
    if let Some(id) = signals.meta(PRODUCT_ID_META)? {
        return Ok(Some(id));
    }
    signals.attribute(PRODUCT_ID_ATTRIBUTE)
}
