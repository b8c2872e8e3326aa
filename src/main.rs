//! StudyMate - natural-language study assistant
//!
//! Runs one request from `--command`, or reads requests line by line from
//! stdin until EOF or "quit".

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use studymate::{CommandPipeline, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Keep records in memory only
    #[arg(long)]
    memory: bool,

    /// SQLite database path (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Enable the Ollama classifier and content generator
    #[arg(long)]
    ollama: bool,

    /// Config file (defaults to the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single request and exit
    #[arg(short, long)]
    command: Option<String>,
}

const QUIT_WORDS: &[&str] = &["quit", "exit", "bye", "goodbye"];

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if args.memory {
        config.storage_backend = "memory".to_string();
    }
    if let Some(db) = &args.db {
        config.database_path = db.to_string_lossy().to_string();
    }
    if args.ollama {
        config.ollama_enabled = true;
    }

    // Setup logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("📚 StudyMate v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut pipeline = CommandPipeline::from_config(&config).await?;

    if let Some(command) = args.command {
        let response = pipeline.handle(&command).await;
        println!("{}", response.message);
        return Ok(());
    }

    info!("✅ StudyMate ready - type a request");
    info!("   Try: 'make 5 flashcards about react', 'delete my physics notes'");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if QUIT_WORDS.contains(&line.to_lowercase().as_str()) {
            break;
        }

        let response = pipeline.handle(line).await;
        if !response.success && !response.requires_confirmation {
            warn!("Request not fully handled: '{}'", line);
        }
        println!("{}", response.message);
    }

    info!("👋 Goodbye");
    Ok(())
}
