//! Ingestion progress reporting.
//!
//! Reports what the ingestor is doing (extracting, chunking, embedding,
//! persisting) so a user uploading a large PDF sees that work is happening.
//! Progress is emitted on **stderr** so stdout stays reserved for answers.

use std::io::{IsTerminal, Write};

/// A single progress event from the ingestion pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IngestProgressEvent {
    /// Text extraction has started for this file.
    Extracting { file: String },
    /// Extraction and chunking finished.
    Chunked { pages: u32, chunks: u64 },
    /// `n` of `total` chunks have been embedded.
    Embedding { n: u64, total: u64 },
    /// Writing chunks and vectors to the store.
    Persisting,
}

/// Receives ingestion progress. Called from the ingest pipeline.
pub trait IngestProgressReporter: Send + Sync {
    fn report(&self, event: IngestProgressEvent);
}

/// Human-friendly progress on stderr: `ingest  embedding  64 / 128 chunks`.
pub struct StderrProgress;

impl IngestProgressReporter for StderrProgress {
    fn report(&self, event: IngestProgressEvent) {
        let line = match &event {
            IngestProgressEvent::Extracting { file } => {
                format!("ingest {}  extracting...\n", file)
            }
            IngestProgressEvent::Chunked { pages, chunks } => format!(
                "ingest  chunked  {} pages into {} chunks\n",
                format_number(*pages as u64),
                format_number(*chunks)
            ),
            IngestProgressEvent::Embedding { n, total } => format!(
                "ingest  embedding  {} / {} chunks\n",
                format_number(*n),
                format_number(*total)
            ),
            IngestProgressEvent::Persisting => "ingest  persisting...\n".to_string(),
        };
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(line.as_bytes());
        let _ = err.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl IngestProgressReporter for JsonProgress {
    fn report(&self, event: IngestProgressEvent) {
        let obj = match &event {
            IngestProgressEvent::Extracting { file } => serde_json::json!({
                "event": "progress",
                "phase": "extracting",
                "file": file
            }),
            IngestProgressEvent::Chunked { pages, chunks } => serde_json::json!({
                "event": "progress",
                "phase": "chunked",
                "pages": pages,
                "chunks": chunks
            }),
            IngestProgressEvent::Embedding { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "embedding",
                "n": n,
                "total": total
            }),
            IngestProgressEvent::Persisting => serde_json::json!({
                "event": "progress",
                "phase": "persisting"
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut err = std::io::stderr().lock();
            let _ = writeln!(err, "{}", line);
            let _ = err.flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl IngestProgressReporter for NoProgress {
    fn report(&self, _event: IngestProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a terminal, otherwise off.
    pub fn default_for_tty() -> Self {
        if std::io::stderr().is_terminal() {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn IngestProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
