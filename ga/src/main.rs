//! greenalt - sustainable alternative finder
//!
//! CLI entry point for rating products and searching for greener alternatives.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use greenalt::cli::{Cli, Command, OutputFormat};
use greenalt::config::Config;
use greenalt::conversation::{ConversationController, RunOutcome};
use greenalt::governor::RequestGovernor;
use greenalt::llm::{CompletionClient, create_client};
use greenalt::reply::SustainabilityRating;
use greenalt::search::{ProductLookup, ProductRecord, ProductSearch, RapidApiClient, SearchQuery, ToolInvoker};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("greenalt")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("greenalt.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Find {
            product_id,
            format,
            max_iterations,
        } => cmd_find(config, &product_id, format, max_iterations).await,
        Command::Search {
            query,
            max_price,
            format,
        } => cmd_search(&config, &query, max_price, format).await,
        Command::Product { ids, format } => cmd_product(&config, &ids, format).await,
    }
}

/// Cancel the token on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling run");
            token.cancel();
        }
    });
    cancel
}

/// Run the full find loop for one product
async fn cmd_find(
    mut config: Config,
    product_id: &str,
    format: OutputFormat,
    max_iterations: Option<u32>,
) -> Result<()> {
    debug!(%product_id, ?format, ?max_iterations, "cmd_find: called");
    if let Some(n) = max_iterations {
        config.conversation.max_iterations = n;
    }
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create completion client")?;
    let governor = Arc::new(RequestGovernor::new(CompletionClient::new(llm), &config.governor));
    let rapid = Arc::new(RapidApiClient::from_config(&config.search).context("Failed to create search client")?);
    let tools = ToolInvoker::new(rapid.clone(), config.search.clone());
    let controller = ConversationController::new(governor.clone(), tools, rapid, config.conversation.clone());

    if format == OutputFormat::Text {
        println!("{} {}", "Searching for alternatives to".dimmed(), product_id.cyan());
    }

    let cancel = cancel_on_interrupt();
    let outcome = controller.find_alternative(product_id, &cancel).await;

    let stats = governor.stats();
    info!(
        submissions = stats.submissions,
        attempts = stats.attempts,
        retries = stats.retries,
        failures = stats.failures,
        "Completion service usage"
    );

    let outcome = outcome.map_err(|e| eyre::eyre!("[{}] {}", e.kind(), e))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print_outcome(&outcome),
    }
    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    let title = outcome.product_title.as_deref().unwrap_or("(untitled)");
    println!("{} {}", outcome.product_id.cyan(), title);
    print_rating("  Original", &outcome.result.original_sustainability_rating);

    match &outcome.result.new_product {
        Some(alt) => {
            println!("{} Suggested alternative: {}", "✓".green(), alt.id.green().bold());
            if let Some(details) = &outcome.alternative {
                if let Some(title) = &details.title {
                    println!("  {}", title);
                }
                if let Some(price) = &details.price {
                    println!("  {} {}", "Price:".dimmed(), price);
                }
                if let Some(url) = &details.url {
                    println!("  {}", url.underline());
                }
            }
            if let Some(rating) = &alt.sustainability_rating {
                print_rating("  Alternative", rating);
            }
        }
        None => println!("{} Already the most sustainable choice", "✓".green()),
    }

    println!(
        "{}",
        format!(
            "  {} completion calls, {} searches, price ceiling {:.2}, run {}",
            outcome.stats.completion_calls, outcome.stats.tool_calls, outcome.max_price, outcome.run_id
        )
        .dimmed()
    );
}

fn print_rating(label: &str, rating: &SustainabilityRating) {
    let overall = format!("{:.2}", rating.overall());
    let overall = if rating.overall() >= 3.5 {
        overall.green()
    } else if rating.overall() >= 2.5 {
        overall.yellow()
    } else {
        overall.red()
    };
    println!(
        "{}: {} (material {}, production {}, shipping {}, disposability {})",
        label, overall, rating.material, rating.production, rating.shipping, rating.disposability
    );
}

/// Run a single product search and list the results
async fn cmd_search(config: &Config, query: &str, max_price: f64, format: OutputFormat) -> Result<()> {
    debug!(%query, max_price, ?format, "cmd_search: called");
    let client = RapidApiClient::from_config(&config.search).context("Failed to create search client")?;
    let request = SearchQuery {
        query: query.to_string(),
        max_price,
        page: config.search.page,
        country: config.search.country.clone(),
        sort_by: config.search.sort_by.clone(),
        product_condition: config.search.product_condition.clone(),
    };

    let mut products = client.search(&request).await.context("Product search failed")?;
    products.truncate(config.search.max_results);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&products)?),
        OutputFormat::Text => {
            if products.is_empty() {
                println!("No products found");
            }
            for product in &products {
                print_product(product);
            }
        }
    }
    Ok(())
}

/// Show details for the given product ids
async fn cmd_product(config: &Config, ids: &[String], format: OutputFormat) -> Result<()> {
    debug!(?ids, ?format, "cmd_product: called");
    let client = RapidApiClient::from_config(&config.search).context("Failed to create search client")?;
    let product = client.product_details(ids).await.context("Product lookup failed")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&product)?),
        OutputFormat::Text => print_product(&product),
    }
    Ok(())
}

fn print_product(product: &ProductRecord) {
    println!(
        "{} {} {}",
        product.id().unwrap_or("?").yellow(),
        product.price_text().unwrap_or_else(|| "-".to_string()).dimmed(),
        product.title().unwrap_or("(untitled)")
    );
}
