//! Product data service transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::config::SearchConfig;
use super::error::{LookupError, SearchError};
use super::types::{ProductDetailsResponse, ProductRecord, SearchQuery, SearchResponse};

/// Product search endpoint
#[async_trait]
pub trait ProductSearch: Send + Sync {
    /// Products matching the query, in the service's ranking order
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ProductRecord>, SearchError>;
}

/// Product-details endpoint
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Details for one or more product ids
    ///
    /// Fails with [`LookupError::NotFound`] when the service returns no data.
    async fn product_details(&self, ids: &[String]) -> Result<ProductRecord, LookupError>;
}

/// RapidAPI real-time product data client
pub struct RapidApiClient {
    host: String,
    api_key: String,
    country: String,
    http: Client,
}

impl RapidApiClient {
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        debug!(host = %config.host, "RapidApiClient::from_config: called");
        let api_key = config.get_api_key().map_err(|e| SearchError::Config(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(SearchError::Network)?;

        Ok(Self {
            host: config.host.clone(),
            api_key,
            country: config.country.clone(),
            http,
        })
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("https://{}/{}", self.host, path))
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
    }
}

#[async_trait]
impl ProductSearch for RapidApiClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ProductRecord>, SearchError> {
        debug!(query = %query.query, max_price = query.max_price, "RapidApiClient::search: called");
        let response = self.get("search").query(&query.to_params()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| SearchError::Malformed(e.to_string()))?;
        debug!(status = ?parsed.status, request_id = ?parsed.request_id, "RapidApiClient::search: response parsed");

        Ok(parsed.into_products())
    }
}

#[async_trait]
impl ProductLookup for RapidApiClient {
    async fn product_details(&self, ids: &[String]) -> Result<ProductRecord, LookupError> {
        let joined = ids.join(",");
        debug!(ids = %joined, "RapidApiClient::product_details: called");
        let response = self
            .get("product-details")
            .query(&[("asin", joined.as_str()), ("country", self.country.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ProductDetailsResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Malformed(e.to_string()))?;
        debug!(status = ?parsed.status, request_id = ?parsed.request_id, "RapidApiClient::product_details: response parsed");

        parsed.into_record().ok_or(LookupError::NotFound { ids: joined })
    }
}
