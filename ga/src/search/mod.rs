//! Product data service: search tool and product lookup
//!
//! - [`ToolInvoker`] runs bounded, never-failing searches for the conversation loop
//! - [`ProductLookup`] resolves the product a run starts from
//! - [`RapidApiClient`] is the HTTP transport behind both

mod client;
mod config;
mod error;
mod invoker;
mod types;

pub use client::{ProductLookup, ProductSearch, RapidApiClient};
pub use config::SearchConfig;
pub use error::{LookupError, SearchError};
pub use invoker::{NO_PRODUCTS_FOUND, ToolInvoker, product_message};
pub use types::{ProductRecord, SearchQuery, parse_price};

#[cfg(test)]
pub use client::mock::MockLookup;
#[cfg(test)]
pub use invoker::mock::MockSearch;
