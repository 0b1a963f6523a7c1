//! Product search configuration

use serde::{Deserialize, Serialize};

/// Product search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// RapidAPI host of the product data service
    pub host: String,

    /// Environment variable containing the RapidAPI key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// Marketplace country code
    pub country: String,

    /// Result ordering requested from the service
    #[serde(rename = "sort-by")]
    pub sort_by: String,

    /// Product condition filter
    #[serde(rename = "product-condition")]
    pub product_condition: String,

    /// Result page to request
    pub page: u32,

    /// Records kept per search, in service ranking order
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            host: "real-time-amazon-data.p.rapidapi.com".to_string(),
            api_key_env: "RAPID_API_KEY".to_string(),
            country: "US".to_string(),
            sort_by: "RELEVANCE".to_string(),
            product_condition: "ALL".to_string(),
            page: 1,
            max_results: 10,
            timeout_ms: 30_000,
        }
    }
}

impl SearchConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> eyre::Result<String> {
        std::env::var(&self.api_key_env)
            .map_err(|_| eyre::eyre!("Search API key not found. Set the {} environment variable.", self.api_key_env))
    }
}
