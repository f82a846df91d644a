//! reqlens CLI — the main entry point.
//!
//! Commands:
//! - `serve`      — Start the HTTP API server
//! - `ingest`     — Store a requirement
//! - `check`      — Check a source file against its requirement
//! - `show`       — Print a stored requirement
//! - `languages`  — List accepted languages
//! - `doctor`     — Diagnose config, store and model endpoints

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "reqlens",
    about = "reqlens — check code against the requirements it implements",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Store a requirement and print its id
    Ingest {
        /// Read the requirement text from a file
        #[arg(short, long, conflicts_with = "text", required_unless_present = "text")]
        file: Option<PathBuf>,

        /// Requirement text given inline
        #[arg(short, long)]
        text: Option<String>,

        /// `Req` or `Def`
        #[arg(short, long)]
        category: String,

        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },

    /// Check a source file and print the feedback as JSON
    Check {
        /// Source file to check
        #[arg(short, long)]
        file: PathBuf,

        /// Language of the source file
        #[arg(short, long)]
        language: String,

        /// Requirement to check against; resolved from the code if omitted
        #[arg(short, long)]
        requirement_id: Option<String>,
    },

    /// Print a stored requirement
    Show {
        /// Requirement id
        id: String,
    },

    /// List the languages `check` accepts
    Languages,

    /// Diagnose config, store and model endpoints
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `check` output stays pipeable.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ingest {
            file,
            text,
            category,
            id,
        } => commands::ingest::run(file, text, category, id).await?,
        Commands::Check {
            file,
            language,
            requirement_id,
        } => commands::check::run(file, language, requirement_id).await?,
        Commands::Show { id } => commands::show::run(id).await?,
        Commands::Languages => commands::languages::run()?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
