//! REST client for the catalog, reference-data and order APIs.
//!
//! # Architecture
//!
//! - One [`ApiClient`] wraps a shared `reqwest::Client` and the API base URL
//! - Each backend concern is a gateway trait ([`CatalogGateway`],
//!   [`ReferenceDataGateway`], [`OrderGateway`]) so controllers can be driven
//!   by the HTTP client in production and by in-memory fakes in tests
//! - Collection endpoints return HAL envelopes (`_embedded` + `page`)
//!
//! # Example
//!
//! ```rust,ignore
//! use meme_shop_storefront::api::{ApiClient, CatalogGateway};
//!
//! let client = ApiClient::new(&config.api)?;
//!
//! let page = client.products_by_category(CategoryId::new(1), 0, 8).await?;
//! let countries = client.countries().await?;
//! ```

mod catalog;
mod checkout;
mod reference;
pub mod types;

pub use catalog::CatalogGateway;
pub use checkout::OrderGateway;
pub use reference::{ReferenceDataGateway, card_months, card_years};
pub use types::*;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The base URL cannot carry resource paths.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

// =============================================================================
// ApiClient
// =============================================================================

/// HTTP client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the base URL
    /// cannot have path segments appended.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
            }),
        })
    }

    /// The API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build the URL for `path` (slash-separated, relative to the base URL)
    /// with the given query pairs.
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        debug!(%url, "GET");

        let response = self
            .authorize(self.inner.client.get(url))
            .header("Accept", "application/json")
            .send()
            .await?;

        Self::decode(path, response).await
    }

    /// Execute a POST request with a JSON body and decode the JSON response.
    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, &[])?;
        debug!(%url, "POST");

        let response = self
            .authorize(self.inner.client.post(url))
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Storefront API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let api = client("http://localhost:8080/api");
        let url = api
            .endpoint(
                "products/search/findByCategoryId",
                &[("id", "2".to_string()), ("page", "0".to_string())],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/products/search/findByCategoryId?id=2&page=0"
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let api = client("http://localhost:8080/api/");
        let url = api.endpoint("countries", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/countries");
    }

    #[test]
    fn test_endpoint_encodes_query_values() {
        let api = client("http://localhost:8080/api");
        let url = api
            .endpoint(
                "products/search/findByNameContaining",
                &[("name", "doge & cat".to_string())],
            )
            .unwrap();
        assert_eq!(url.query(), Some("name=doge+%26+cat"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = ApiConfig::new(Url::parse("mailto:shop@example.com").unwrap());
        assert!(matches!(
            ApiClient::new(&config),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");

        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
