//! Command-line interface.
//!
//! Parses arguments, loads [`Settings`] and dispatches to the command
//! modules.

mod analyze;
mod check;
mod icons;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "docsight")]
#[command(about = "Document text extraction with engagement metrics and AI insights")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides the default location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind: "port", "host" or "host:port" (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Analyze a local file and print the response JSON
    Analyze {
        /// File to analyze
        file: PathBuf,
        /// Content type to declare (guessed from the file when omitted)
        #[arg(short, long)]
        mime: Option<String>,
        /// Skip AI enhancement
        #[arg(long)]
        no_ai: bool,
    },

    /// Check extraction tools and AI configuration
    Check,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Analyze { file, mime, no_ai } => {
            analyze::cmd_analyze(&settings, &file, mime.as_deref(), no_ai).await
        }
        Commands::Check => check::cmd_check(&settings).await,
    }
}
