//! # PDF Assistant CLI (`pdfqa`)
//!
//! Ask questions about a PDF document, answered by a local Ollama model.
//!
//! ## Usage
//!
//! ```bash
//! pdfqa --config ./config/pdfqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfqa chat [--pdf <file>]` | Interactive session |
//! | `pdfqa ask "<question>" [--pdf <file>]` | Answer one question and exit |
//! | `pdfqa ingest <file>` | Index a PDF into the on-disk store |
//! | `pdfqa guide` | Print the usage guide |
//!
//! ## Examples
//!
//! ```bash
//! # Chat about a report
//! pdfqa chat --pdf ./report.pdf
//!
//! # One-shot question without a document
//! pdfqa ask "What is the capital of France?"
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pdf_assistant::chat::ChatApp;
use pdf_assistant::config;
use pdf_assistant::ingest::Ingestor;
use pdf_assistant::progress::ProgressMode;
use pdf_assistant::provider::ModelProvider;
use pdf_assistant::session::Session;
use pdf_assistant::ui;

/// PDF Assistant: ask questions about a PDF document using a local model.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults (Ollama on
/// 127.0.0.1:11434, model `mistral`).
#[derive(Parser)]
#[command(
    name = "pdfqa",
    about = "PDF Assistant: ask questions about a PDF document using a local model",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pdfqa.toml")]
    config: PathBuf,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ingestion progress on stderr. Defaults to `human` on a terminal,
    /// otherwise `off`.
    #[arg(long, global = true, value_enum)]
    progress: Option<ProgressMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session.
    ///
    /// Type questions at the prompt; use /upload <path> to load a PDF and
    /// /help for the usage guide.
    Chat {
        /// PDF to load before the first prompt.
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Answer a single question and exit.
    ///
    /// The answer is streamed to stdout. Without `--pdf` the model answers
    /// from general knowledge.
    Ask {
        /// The question to ask.
        question: String,

        /// PDF to answer from.
        #[arg(long)]
        pdf: Option<PathBuf>,
    },

    /// Index a PDF into the on-disk vector store and print a summary.
    Ingest {
        /// Path to the PDF file.
        file: PathBuf,
    },

    /// Print the usage guide.
    Guide,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Guide = cli.command {
        ui::guide(&mut std::io::stdout())?;
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    if !cfg.ui.color {
        colored::control::set_override(false);
    }
    let progress = cli.progress.unwrap_or_else(ProgressMode::default_for_tty);
    let provider = Arc::new(ModelProvider::new(cfg.model.clone()));
    let live_cursor = std::io::stdout().is_terminal();

    match cli.command {
        Commands::Guide => {}
        Commands::Chat { pdf } => {
            let app = ChatApp::new(&cfg, provider, progress).with_live_cursor(live_cursor);
            let mut session = Session::new();
            let mut out = std::io::stdout();
            if let Some(path) = pdf {
                app.load_document(&mut session, &path, &mut out).await?;
            }
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            app.run(&mut session, input, &mut out).await?;
        }
        Commands::Ask { question, pdf } => {
            if question.trim().is_empty() {
                anyhow::bail!("question must not be empty");
            }
            let app = ChatApp::new(&cfg, provider, progress).with_live_cursor(live_cursor);
            let mut session = Session::new();
            let mut out = std::io::stdout();
            if let Some(path) = pdf {
                app.upload_file(&mut session, &path, &mut out).await?;
            }
            app.ask(&mut session, question.trim(), &mut out).await?;
        }
        Commands::Ingest { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());

            let ingestor = Ingestor::new(provider, &cfg).with_progress(progress.reporter());
            let (_store, report) = ingestor.ingest_pdf(&bytes, &file_name).await?;

            println!("ingest {}", report.document.file_name);
            println!("  pages: {}", report.document.page_count);
            println!("  chunks written: {}", report.document.chunk_count);
            println!("  store chunks: {}", report.store_chunks);
            println!("  store: {}", cfg.store.path.display());
            println!("ok");
        }
    }

    Ok(())
}
