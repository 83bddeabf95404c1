//! Interactive chat loop wiring user input to the ingestor and responder.
//!
//! The loop is generic over its input and output so it can run against
//! stdin/stdout or against in-memory buffers. Each line is parsed into a
//! [`Command`]; the session is passed by `&mut` into every handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::Config;
use crate::ingest::{Ingestor, UploadOutcome};
use crate::models::Message;
use crate::progress::ProgressMode;
use crate::provider::ModelProvider;
use crate::responder::Responder;
use crate::session::Session;
use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Upload(PathBuf),
    History,
    Help,
    Quit,
    Ask(String),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<std::result::Result<Command, String>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if !line.starts_with('/') {
            return Some(Ok(Command::Ask(line.to_string())));
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let cmd = match name {
            "/upload" if arg.is_empty() => Err("usage: /upload <path-to-pdf>".to_string()),
            "/upload" => Ok(Command::Upload(PathBuf::from(arg))),
            "/history" => Ok(Command::History),
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            other => Err(format!("unknown command {} (try /help)", other)),
        };
        Some(cmd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct ChatApp {
    responder: Responder,
    ingestor: Ingestor,
    token_delay: Duration,
    live_cursor: bool,
}

impl ChatApp {
    pub fn new(config: &Config, provider: Arc<ModelProvider>, progress: ProgressMode) -> Self {
        let responder = Responder::new(provider.clone(), &config.retrieval);
        let ingestor = Ingestor::new(provider, config).with_progress(progress.reporter());
        Self::from_parts(
            responder,
            ingestor,
            Duration::from_millis(config.ui.token_delay_ms),
        )
    }

    pub fn from_parts(responder: Responder, ingestor: Ingestor, token_delay: Duration) -> Self {
        Self {
            responder,
            ingestor,
            token_delay,
            live_cursor: false,
        }
    }

    /// Redraw a cursor after the partial answer. Only sensible on a terminal.
    pub fn with_live_cursor(mut self, live: bool) -> Self {
        self.live_cursor = live;
        self
    }

    /// Read lines from `input` until end of input or `/quit`.
    pub async fn run<R, W>(&self, session: &mut Session, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        ui::banner(out)?;
        let mut lines = input.lines();
        loop {
            ui::prompt(out)?;
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                writeln!(out)?;
                break;
            };
            if self.handle_line(session, &line, out).await? == Flow::Quit {
                break;
            }
        }
        tracing::debug!(messages = session.transcript().len(), "chat session ended");
        Ok(())
    }

    pub async fn handle_line<W: Write>(
        &self,
        session: &mut Session,
        line: &str,
        out: &mut W,
    ) -> Result<Flow> {
        match Command::parse(line) {
            None => {}
            Some(Err(usage)) => ui::notice(out, &usage)?,
            Some(Ok(Command::Quit)) => return Ok(Flow::Quit),
            Some(Ok(Command::Help)) => ui::guide(out)?,
            Some(Ok(Command::History)) => ui::transcript(out, session.transcript())?,
            Some(Ok(Command::Upload(path))) => self.load_document(session, &path, out).await?,
            Some(Ok(Command::Ask(question))) => self.ask(session, &question, out).await?,
        }
        Ok(Flow::Continue)
    }

    /// Load the PDF at `path`, rendering any failure instead of returning it.
    ///
    /// An upload failure ends that upload, not the session. Only errors
    /// writing to `out` are returned.
    pub async fn load_document<W: Write>(
        &self,
        session: &mut Session,
        path: &Path,
        out: &mut W,
    ) -> Result<()> {
        if let Err(e) = self.upload_file(session, path, out).await {
            tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "upload failed");
            ui::error(out, &e)?;
        }
        Ok(())
    }

    /// Load the PDF at `path` into the session.
    pub async fn upload_file<W: Write>(
        &self,
        session: &mut Session,
        path: &Path,
        out: &mut W,
    ) -> Result<()> {
        if session.has_document() {
            ui::notice(out, "A document is already loaded; upload ignored.")?;
            return Ok(());
        }

        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        ui::notice(out, "⏳ Analysing document...")?;
        out.flush()?;
        match self.ingestor.upload(session, &bytes, &file_name).await? {
            UploadOutcome::Ingested(report) => ui::success(
                out,
                &format!(
                    "Document analysed successfully: {} ({} pages, {} chunks)",
                    report.document.file_name,
                    report.document.page_count,
                    report.document.chunk_count
                ),
            )?,
            UploadOutcome::Ignored => {
                ui::notice(out, "A document is already loaded; upload ignored.")?
            }
        }
        Ok(())
    }

    /// One round trip: show the question, stream the answer, record both.
    ///
    /// The pair is recorded even when writing the answer fails, with
    /// whatever was streamed before the failure, so the transcript keeps
    /// alternating and the session stays usable.
    pub async fn ask<W: Write>(
        &self,
        session: &mut Session,
        question: &str,
        out: &mut W,
    ) -> Result<()> {
        let mut answer = String::new();
        let streamed = match ui::message(out, &Message::user(question)) {
            Ok(()) => {
                let tokens = self
                    .responder
                    .respond(question, session.vector_store())
                    .await;
                ui::stream_answer(out, tokens, self.token_delay, self.live_cursor, &mut answer)
                    .await
            }
            Err(e) => Err(e),
        };

        session.push_user(question);
        session.push_assistant(answer);
        streamed.context("Failed to write answer")
    }
}
