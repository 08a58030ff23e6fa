//! # docqa CLI
//!
//! ## Usage
//!
//! ```bash
//! docqa --config ./config/docqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa serve` | Start the HTTP API |
//! | `docqa chunk <file>` | Print the chunks of a local file |
//! | `docqa ask "<question>" --file <path>...` | Answer a question from local files |

use clap::{Parser, Subcommand};
use docqa::{ask, chunk_cmd, config, logging, server};
use std::path::PathBuf;

/// docqa: ask questions about your documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/docqa.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "docqa",
    about = "docqa: keyword-retrieval question answering over PDF, DOCX and text documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/docqa.toml`. A missing file means built-in
    /// defaults.
    #[arg(long, global = true, default_value = "./config/docqa.toml")]
    config: PathBuf,

    /// Log at debug level unless `RUST_LOG` is set.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Documents are kept in memory and lost when the server stops.
    Serve {
        /// Override `[server].bind`, e.g. `0.0.0.0:5001`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Extract a local file and print its chunks.
    Chunk {
        /// PDF, DOCX or TXT file.
        file: PathBuf,
    },

    /// Answer a question from local files.
    Ask {
        question: String,

        /// File to load; repeat for several documents.
        #[arg(long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Restrict the answer to one loaded file (by file name).
        #[arg(long)]
        document: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config_or_default(&cli.config)?;
    logging::init(&cfg.logging, cli.verbose)?;

    match cli.command {
        Commands::Serve { bind } => {
            server::run_server(&cfg, bind.as_deref()).await?;
        }
        Commands::Chunk { file } => {
            chunk_cmd::run_chunk(&cfg, &file)?;
        }
        Commands::Ask {
            question,
            files,
            document,
        } => {
            ask::run_ask(&cfg, &question, &files, document.as_deref()).await?;
        }
    }

    Ok(())
}
