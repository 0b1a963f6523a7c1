//! Search and product lookup error types

use thiserror::Error;

/// Errors from the product search endpoint
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed search response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors from the product-details endpoint
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("No product data returned for {ids}")]
    NotFound { ids: String },

    #[error("Product details API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed product details response: {0}")]
    Malformed(String),
}
