//! greenalt - sustainable alternative finder
//!
//! Given a retail product id, greenalt asks a language model to rate the
//! product's sustainability and to search for a greener replacement. The
//! model drives a bounded loop of product searches and answers with a
//! structured JSON verdict.
//!
//! # Core Concepts
//!
//! - **One Governor**: every completion call in the process is serialized,
//!   spaced and retried by a single [`RequestGovernor`]
//! - **Bounded Loop**: a run allows a fixed number of search queries, then
//!   forces a final decision
//! - **Degrading Tools**: a failed search becomes "No products found", never
//!   a failed run
//!
//! # Modules
//!
//! - [`governor`] - request serialization, pacing and retry
//! - [`llm`] - completion transport trait and chat completions client
//! - [`search`] - product search tool and product lookup
//! - [`conversation`] - the run state machine
//! - [`reply`] - structured reply decoding
//! - [`prompts`] - prompt templates
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod governor;
pub mod llm;
pub mod prompts;
pub mod reply;
pub mod search;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use conversation::{
    AlternativeDetails, ConversationConfig, ConversationController, ConversationThread, RunOutcome, RunStats,
};
pub use error::{ErrorKind, FindError};
pub use governor::{Clock, GovernorConfig, GovernorError, GovernorStats, RequestGovernor, RetryPolicy, TokioClock};
pub use llm::{
    CompletionClient, CompletionRequest, CompletionResponse, ContentItem, LlmClient, LlmError, Message, OpenAIClient,
    Provider, Role, create_client,
};
pub use prompts::PromptLoader;
pub use reply::{NewProduct, ParseError, StructuredReply, SustainResult, SustainabilityRating, decode};
pub use search::{
    LookupError, ProductLookup, ProductRecord, ProductSearch, RapidApiClient, SearchConfig, SearchError, SearchQuery,
    ToolInvoker,
};
