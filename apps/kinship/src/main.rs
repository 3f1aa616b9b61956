//! # Kinship - Personal Relationship Graph
//!
//! The main binary for the Kinship keyed object store.
//!
//! This application provides:
//! - CLI interface for people, relationship types, links, and group nodes
//! - Photo attachment with bounded thumbnail derivation
//! - Legacy flat-key import
//!
//! ## Usage
//!
//! ```bash
//! # Create a database and add people
//! kinship init
//! kinship add-person --name "Ada Lovelace" --birth-year 1815
//!
//! # Link two entities
//! kinship link --source <id> --target <id> --type-id <id>
//!
//! # Dump the whole graph
//! kinship graph --json-mode
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — KINSHIP_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("KINSHIP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kinship=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
