// @awa-component: RVW-Http
//
//! Request building and JSON response handling shared by the clients.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ClientError, Operation};

/// Attach `Authorization: Bearer {api_key}` when a non-empty key is given.
pub(crate) fn with_bearer(request: RequestBuilder, api_key: Option<&str>) -> RequestBuilder {
    match api_key.filter(|key| !key.is_empty()) {
        Some(key) => request.header(AUTHORIZATION, format!("Bearer {key}")),
        None => request,
    }
}

/// JSON API request with the optional bearer header.
pub(crate) fn json_request(
    http: &Client,
    method: Method,
    url: Url,
    api_key: Option<&str>,
) -> RequestBuilder {
    let request = http
        .request(method, url)
        .header(CONTENT_TYPE, "application/json");
    with_bearer(request, api_key)
}

/// Send `request` and parse a successful response body as JSON.
///
/// Non-2xx statuses become [`ClientError::Http`]; transport and parse
/// failures are passed through as they are.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    operation: Operation,
) -> Result<T, ClientError> {
    let resp = request.send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ClientError::http(operation, status));
    }

    let body = resp.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
