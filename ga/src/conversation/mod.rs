//! Conversation loop
//!
//! A run moves through `Seeding -> AwaitingReply -> (Resolved | Expanding)`,
//! repeating until the model returns a result or the query budget is spent,
//! then `ForcingFinal` makes one last call that must resolve.

mod config;
mod controller;
mod thread;

pub use config::ConversationConfig;
pub use controller::{AlternativeDetails, ConversationController, RunOutcome, RunStats};
pub use thread::ConversationThread;
