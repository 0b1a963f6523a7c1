//! ConversationController - the bounded search-and-rate loop

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::FindError;
use crate::governor::RequestGovernor;
use crate::llm::Message;
use crate::prompts::PromptLoader;
use crate::reply::{self, StructuredReply, SustainResult};
use crate::search::{ProductLookup, ProductRecord, ToolInvoker, product_message};

use super::config::ConversationConfig;
use super::thread::ConversationThread;

/// Where a run currently is
///
/// Every non-terminal state past seeding owns the run's data.
#[derive(Debug)]
enum RunState {
    Seeding,
    AwaitingReply(Run),
    Expanding { run: Run, raw: String, query: String },
    ForcingFinal(Run),
    Resolved { run: Run, result: SustainResult },
    Failed(FindError),
}

impl RunState {
    fn name(&self) -> &'static str {
        match self {
            Self::Seeding => "seeding",
            Self::AwaitingReply(_) => "awaiting-reply",
            Self::Expanding { .. } => "expanding",
            Self::ForcingFinal(_) => "forcing-final",
            Self::Resolved { .. } => "resolved",
            Self::Failed(_) => "failed",
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved { .. } | Self::Failed(_))
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Completion calls made through the governor
    pub completion_calls: u32,
    /// Product searches issued
    pub tool_calls: u32,
    /// Query iterations consumed
    pub iterations: u32,
}

/// Catalog details of the suggested alternative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeDetails {
    pub id: String,
    pub title: Option<String>,
    pub price: Option<String>,
    pub url: Option<String>,
}

impl AlternativeDetails {
    fn from_record(id: &str, record: &ProductRecord) -> Self {
        Self {
            id: id.to_string(),
            title: record.title().map(str::to_string),
            price: record.price_text(),
            url: record.url().map(str::to_string),
        }
    }
}

/// A resolved run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub product_id: String,
    pub product_title: Option<String>,
    pub max_price: f64,
    pub result: SustainResult,
    /// Present only when a new product was suggested and its lookup succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative: Option<AlternativeDetails>,
    pub stats: RunStats,
}

/// Per-run mutable data, never shared between runs
#[derive(Debug)]
struct Run {
    thread: ConversationThread,
    product: ProductRecord,
    max_price: f64,
    stats: RunStats,
}

/// Drives one product through query/search rounds to a final rating
///
/// Runs are independent; many may execute concurrently on one controller,
/// all sharing the governor's throttle.
pub struct ConversationController {
    governor: Arc<RequestGovernor>,
    tools: ToolInvoker,
    lookup: Arc<dyn ProductLookup>,
    prompts: PromptLoader,
    config: ConversationConfig,
}

impl ConversationController {
    pub fn new(
        governor: Arc<RequestGovernor>,
        tools: ToolInvoker,
        lookup: Arc<dyn ProductLookup>,
        config: ConversationConfig,
    ) -> Self {
        debug!(?config, "ConversationController::new: called");
        let prompts = PromptLoader::new(config.prompts_dir.as_deref());
        Self {
            governor,
            tools,
            lookup,
            prompts,
            config,
        }
    }

    /// Replace the prompt source
    pub fn with_prompts(mut self, prompts: PromptLoader) -> Self {
        self.prompts = prompts;
        self
    }

    /// Find a more sustainable alternative to `product_id`
    pub async fn find_alternative(&self, product_id: &str, cancel: &CancellationToken) -> Result<RunOutcome, FindError> {
        let run_id = Uuid::now_v7();
        let span = info_span!("run", %run_id, %product_id);
        self.drive(run_id, product_id, cancel).instrument(span).await
    }

    async fn drive(&self, run_id: Uuid, product_id: &str, cancel: &CancellationToken) -> Result<RunOutcome, FindError> {
        debug!("ConversationController::drive: called");
        info!("Finding alternatives for {}", product_id);

        let mut state = RunState::Seeding;

        loop {
            if !state.is_terminal() && cancel.is_cancelled() {
                debug!(state = state.name(), "ConversationController::drive: cancelled");
                state = RunState::Failed(FindError::Cancelled);
            }
            debug!(state = state.name(), "ConversationController::drive: step");

            state = match state {
                RunState::Seeding => match self.seed(product_id, cancel).await {
                    Ok(run) if self.config.max_iterations == 0 => RunState::ForcingFinal(run),
                    Ok(run) => RunState::AwaitingReply(run),
                    Err(e) => RunState::Failed(e),
                },
                RunState::AwaitingReply(mut run) => match self.ask(&mut run, cancel).await {
                    Ok((_, StructuredReply::Result(result))) => RunState::Resolved { run, result },
                    Ok((raw, StructuredReply::Query { query })) => RunState::Expanding { run, raw, query },
                    Err(e) => RunState::Failed(e),
                },
                RunState::Expanding { mut run, raw, query } => match self.expand(&mut run, raw, &query, cancel).await {
                    Ok(()) if run.stats.iterations < self.config.max_iterations => RunState::AwaitingReply(run),
                    Ok(()) => {
                        info!("Max iteration count reached");
                        RunState::ForcingFinal(run)
                    }
                    Err(e) => RunState::Failed(e),
                },
                RunState::ForcingFinal(mut run) => match self.force_final(&mut run, cancel).await {
                    Ok(result) => RunState::Resolved { run, result },
                    Err(e) => RunState::Failed(e),
                },
                RunState::Resolved { run, result } => {
                    info!(
                        completion_calls = run.stats.completion_calls,
                        tool_calls = run.stats.tool_calls,
                        has_new_product = result.new_product.is_some(),
                        "Run resolved"
                    );
                    let alternative = self.describe_alternative(&result, cancel).await;
                    return Ok(RunOutcome {
                        run_id,
                        product_id: product_id.to_string(),
                        product_title: run.product.title().map(str::to_string),
                        max_price: run.max_price,
                        result,
                        alternative,
                        stats: run.stats,
                    });
                }
                RunState::Failed(e) => {
                    warn!(kind = %e.kind(), error = %e, "Run failed");
                    return Err(e);
                }
            };
        }
    }

    /// Look up the product and build the opening thread
    async fn seed(&self, product_id: &str, cancel: &CancellationToken) -> Result<Run, FindError> {
        debug!(%product_id, "ConversationController::seed: called");
        let ids = [product_id.to_string()];
        let product = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FindError::Cancelled),
            result = self.lookup.product_details(&ids) => result?,
        };

        let price = product.price().ok_or_else(|| FindError::MissingPrice {
            id: product_id.to_string(),
        })?;
        let max_price = self.config.price_ceiling(price);
        debug!(price, max_price, "ConversationController::seed: price ceiling computed");

        let system = self.prompts.system_prompt().map_err(|e| FindError::Prompt(e.to_string()))?;
        Ok(Run {
            thread: ConversationThread::seeded(system, product_message(&product)),
            product,
            max_price,
            stats: RunStats::default(),
        })
    }

    /// One governed completion call, decoded
    async fn ask(&self, run: &mut Run, cancel: &CancellationToken) -> Result<(String, StructuredReply), FindError> {
        debug!(thread_len = run.thread.len(), "ConversationController::ask: called");
        run.stats.completion_calls += 1;
        let raw = self.governor.submit(run.thread.messages(), cancel).await?;
        let reply = reply::decode(&raw)?;
        Ok((raw, reply))
    }

    /// Run the requested search and append the round to the thread
    async fn expand(&self, run: &mut Run, raw: String, query: &str, cancel: &CancellationToken) -> Result<(), FindError> {
        debug!(%query, iteration = run.stats.iterations, "ConversationController::expand: called");
        let products = self.tools.search(query, run.max_price, cancel).await;
        run.stats.tool_calls += 1;

        let remaining = self.config.max_iterations - run.stats.iterations;
        let followup = self
            .prompts
            .followup(remaining)
            .map_err(|e| FindError::Prompt(e.to_string()))?;

        run.thread.push(Message::assistant(raw));
        run.thread.extend(self.tools.observations(&products));
        run.thread.push(Message::system(followup));
        run.stats.iterations += 1;
        Ok(())
    }

    /// Fetch catalog details for the suggested product
    ///
    /// The rating stands on its own, so a failed or cancelled lookup only
    /// leaves the details out.
    async fn describe_alternative(&self, result: &SustainResult, cancel: &CancellationToken) -> Option<AlternativeDetails> {
        let id = &result.new_product.as_ref()?.id;
        debug!(%id, "ConversationController::describe_alternative: called");
        let ids = [id.clone()];
        let lookup = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("ConversationController::describe_alternative: cancelled");
                return None;
            }
            lookup = self.lookup.product_details(&ids) => lookup,
        };

        match lookup {
            Ok(record) => Some(AlternativeDetails::from_record(id, &record)),
            Err(e) => {
                warn!(%id, error = %e, "Could not look up suggested alternative");
                None
            }
        }
    }

    /// Demand a final result; a further query is a failure
    async fn force_final(&self, run: &mut Run, cancel: &CancellationToken) -> Result<SustainResult, FindError> {
        debug!("ConversationController::force_final: called");
        let instruction = self.prompts.forced_final().map_err(|e| FindError::Prompt(e.to_string()))?;
        run.thread.push(Message::system(instruction));

        match self.ask(run, cancel).await? {
            (_, StructuredReply::Result(result)) => Ok(result),
            (_, StructuredReply::Query { query }) => {
                debug!(%query, "ConversationController::force_final: model asked for another query");
                Err(FindError::NoFinalDecision)
            }
        }
    }
}
