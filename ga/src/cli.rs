//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// greenalt - sustainable alternative finder
#[derive(Parser)]
#[command(
    name = "ga",
    about = "Find more sustainable alternatives to retail products",
    version,
    after_help = after_help()
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rate a product and look for a more sustainable alternative
    Find {
        /// Product id (ASIN)
        #[arg(value_name = "ID")]
        product_id: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Search queries allowed before a final decision is forced
        #[arg(short, long)]
        max_iterations: Option<u32>,
    },

    /// Run a single product search
    Search {
        /// Search query
        query: String,

        /// Price ceiling
        #[arg(short = 'p', long)]
        max_price: f64,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show product details for one or more ids
    Product {
        /// Product ids (ASINs)
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format for command results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text, json", s)),
        }
    }
}

/// Path of the log file written by the binary
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("greenalt")
        .join("logs")
        .join("greenalt.log")
}

fn after_help() -> String {
    format!(
        "Environment:\n  AZURE_OAI_KEY    completion service key (default llm.api-key-env)\n  RAPID_API_KEY    product data service key (default search.api-key-env)\n\nLogs are written to: {}",
        get_log_path().display()
    )
}
