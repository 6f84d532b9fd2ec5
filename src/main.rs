//! # Docent CLI
//!
//! The `docent` binary answers questions against a curated knowledge base
//! and provides the supporting inspection commands.
//!
//! ## Usage
//!
//! ```bash
//! docent --config ./config/docent.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docent ask "<question>"` | Build the index and answer one question |
//! | `docent chunks` | Chunk the knowledge base without embedding |
//! | `docent eval <file>` | Run a query list and summarize decisions |
//! | `docent serve` | Start the HTTP query service |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docent::{ask, config, eval, server, stats};

/// Docent — question answering over a curated knowledge base, with
/// domain gating and confidence-aware refusals.
#[derive(Parser)]
#[command(
    name = "docent",
    about = "Docent — question answering over a curated knowledge base",
    version,
    long_about = "Docent chunks a directory of documents, indexes them with a \
    configurable embedding provider, and answers natural-language questions by \
    retrieving the best passage — or refusing when the question is out of domain \
    or no passage is confident enough."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docent.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Answer a single question against the knowledge base.
    ///
    /// Loads and chunks the documents, builds the index with the configured
    /// embedding provider, and prints the answer with its source and
    /// confidence — or the refusal reason.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Chunk the knowledge base and report counts without embedding.
    ///
    /// Needs no embedding provider; useful for checking what the chunker
    /// extracts from each document before building an index.
    Chunks,

    /// Run a file of queries and summarize answers vs refusals.
    ///
    /// The file holds one question per line; blank lines and `#` comments
    /// are skipped.
    Eval {
        /// Path to the query file.
        file: PathBuf,
    },

    /// Start the HTTP query service.
    ///
    /// Builds the index once at startup, then serves `POST /ask` and
    /// `GET /health` on the address configured in `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Ask { question } => {
            ask::run_ask(&cfg, &question).await?;
        }
        Commands::Chunks => {
            stats::run_chunks(&cfg)?;
        }
        Commands::Eval { file } => {
            eval::run_eval(&cfg, &file).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
