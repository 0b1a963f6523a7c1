//! Product record and search service wire types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// An opaque product record from the search or product-detail service
///
/// Forwarded to the model as-is; only a handful of fields are ever read.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRecord(Map<String, Value>);

impl ProductRecord {
    /// Build from an arbitrary JSON value; `None` unless it is an object
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// Product identifier (ASIN)
    pub fn id(&self) -> Option<&str> {
        self.str_field("asin")
    }

    pub fn title(&self) -> Option<&str> {
        self.str_field("product_title")
    }

    /// Product page link
    pub fn url(&self) -> Option<&str> {
        self.str_field("product_url")
    }

    /// Raw price field as sent by the service
    pub fn price_text(&self) -> Option<String> {
        match self.0.get("product_price")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric price
    ///
    /// Accepts plain numbers and strings like `"599.00"`, `"$1,299.99"`.
    pub fn price(&self) -> Option<f64> {
        let text = self.price_text()?;
        parse_price(&text)
    }

    /// Primary photo, falling back to the first gallery photo
    pub fn photo_url(&self) -> Option<&str> {
        self.str_field("product_photo").or_else(|| {
            self.0
                .get("product_photos")
                .and_then(Value::as_array)
                .and_then(|photos| photos.iter().find_map(Value::as_str))
                .filter(|s| !s.is_empty())
        })
    }

    /// Compact JSON serialization
    pub fn to_json(&self) -> String {
        // A map of JSON values always serializes
        serde_json::to_string(&self.0).unwrap_or_default()
    }
}

/// Parse a price string, tolerating a currency prefix and thousands separators
///
/// Only positive prices are accepted.
pub fn parse_price(text: &str) -> Option<f64> {
    debug!(%text, "parse_price: called");
    let cleaned: String = text
        .trim()
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let number_end = cleaned
        .find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')
        .unwrap_or(cleaned.len());

    cleaned[..number_end]
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

/// Parameters for one search call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub max_price: f64,
    pub page: u32,
    pub country: String,
    pub sort_by: String,
    pub product_condition: String,
}

impl SearchQuery {
    /// Query-string pairs in the order the service documents them
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", self.query.clone()),
            ("page", self.page.to_string()),
            ("country", self.country.clone()),
            ("sort_by", self.sort_by.clone()),
            ("product_condition", self.product_condition.clone()),
            ("max_price", self.max_price.to_string()),
        ]
    }
}

/// Search endpoint response
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub status: Option<String>,
    pub request_id: Option<String>,
    pub data: Option<SearchData>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub total_products: Option<u64>,
    pub products: Option<Vec<Value>>,
}

impl SearchResponse {
    /// Product objects in service order; missing `data.products` means none
    pub fn into_products(self) -> Vec<ProductRecord> {
        self.data
            .and_then(|d| d.products)
            .unwrap_or_default()
            .into_iter()
            .filter_map(ProductRecord::from_value)
            .collect()
    }
}

/// Product-details endpoint response
#[derive(Debug, Deserialize)]
pub struct ProductDetailsResponse {
    pub status: Option<String>,
    pub request_id: Option<String>,
    pub data: Option<Value>,
}

impl ProductDetailsResponse {
    /// First product record in `data` (object, or first object of an array)
    pub fn into_record(self) -> Option<ProductRecord> {
        match self.data? {
            Value::Array(items) => items.into_iter().find_map(ProductRecord::from_value),
            other => ProductRecord::from_value(other),
        }
        .filter(|record| !record.fields().is_empty())
    }
}
