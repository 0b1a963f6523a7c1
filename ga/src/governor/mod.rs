//! Request governor
//!
//! Every completion call in the process goes through one [`RequestGovernor`].
//! It guarantees:
//! - at most one call in flight at a time, callers served in arrival order
//! - a minimum spacing between the starts of consecutive calls
//! - exponential backoff on 429/5xx, immediate abort on anything else

mod clock;
mod config;
mod engine;
mod error;

pub use clock::{Clock, TokioClock};
pub use config::{GovernorConfig, RetryPolicy};
pub use engine::{GovernorStats, RequestGovernor};
pub use error::GovernorError;

#[cfg(test)]
pub use clock::mock::FakeClock;
