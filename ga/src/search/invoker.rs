//! Search tool invoked when the model asks for alternatives

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::ProductSearch;
use super::config::SearchConfig;
use super::types::{ProductRecord, SearchQuery};
use crate::llm::{ContentItem, Message};

/// Observation sent when a search produced nothing usable
pub const NO_PRODUCTS_FOUND: &str = "No products found";

/// Runs product searches for the conversation loop
///
/// Searches never fail the caller: any upstream problem is logged and
/// reported as zero results, since a rating without alternatives is still
/// a valid answer.
pub struct ToolInvoker {
    search: Arc<dyn ProductSearch>,
    config: SearchConfig,
}

impl ToolInvoker {
    pub fn new(search: Arc<dyn ProductSearch>, config: SearchConfig) -> Self {
        debug!(max_results = config.max_results, "ToolInvoker::new: called");
        Self { search, config }
    }

    /// Search below `max_price`, keeping the service's top results
    pub async fn search(&self, query: &str, max_price: f64, cancel: &CancellationToken) -> Vec<ProductRecord> {
        debug!(%query, max_price, "ToolInvoker::search: called");
        info!("Searching products: {} - max price: {}", query, max_price);

        let request = SearchQuery {
            query: query.to_string(),
            max_price,
            page: self.config.page,
            country: self.config.country.clone(),
            sort_by: self.config.sort_by.clone(),
            product_condition: self.config.product_condition.clone(),
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("ToolInvoker::search: cancelled");
                return Vec::new();
            }
            result = self.search.search(&request) => result,
        };

        match result {
            Ok(mut products) => {
                debug!(found = products.len(), "ToolInvoker::search: search succeeded");
                products.truncate(self.config.max_results);
                products
            }
            Err(e) => {
                warn!(%query, error = %e, "Product search failed, treating as no results");
                Vec::new()
            }
        }
    }

    /// Observation messages for a batch of search results
    pub fn observations(&self, products: &[ProductRecord]) -> Vec<Message> {
        if products.is_empty() {
            return vec![Message::system(NO_PRODUCTS_FOUND)];
        }
        products.iter().map(product_message).collect()
    }
}

/// A user turn carrying a serialized product and its photo, if any
pub fn product_message(product: &ProductRecord) -> Message {
    let mut items = vec![ContentItem::text(product.to_json())];
    if let Some(url) = product.photo_url() {
        items.push(ContentItem::image(url));
    }
    Message::user_items(items)
}
