//! Conversation loop configuration

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Conversation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Search queries the model may issue before a final decision is forced
    #[serde(rename = "max-iterations")]
    pub max_iterations: u32,

    /// Search price ceiling as a multiple of the original product's price
    #[serde(rename = "price-ceiling-factor")]
    pub price_ceiling_factor: f64,

    /// Directory of `.pmt` files overriding the embedded prompts
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            price_ceiling_factor: 1.5,
            prompts_dir: None,
        }
    }
}

impl ConversationConfig {
    /// Highest price a searched alternative may have
    pub fn price_ceiling(&self, price: f64) -> f64 {
        price * self.price_ceiling_factor
    }
}
