//! Terminal rendering: banner, usage guide, transcript and streamed answers.
//!
//! Everything writes to a caller-supplied [`Write`] so the chat loop can be
//! driven against an in-memory buffer in tests. Colours come from
//! `colored` and are switched off globally when disabled in the config.

use std::io::{self, Write};
use std::time::Duration;

use colored::*;

use crate::models::{Message, Role};
use crate::responder::Tokens;

/// Shown after the partial answer while tokens are still arriving.
pub const CURSOR: &str = "▌";

pub const USER_LABEL: &str = "👤 you";
pub const ASSISTANT_LABEL: &str = "🤖 assistant";

pub const GUIDE: &str = "\
📖 Usage guide

1. Import a document
   Load a PDF with /upload <path> (or start with --pdf <path>).
   Only the first document of a session is used.

2. Content analysis
   Wait while the assistant extracts, chunks and indexes the document.

3. Ask your questions
   Type a question and press Enter. With a document loaded, answers draw on
   its content; without one, the model answers from general knowledge.

Commands
   /upload <path>   load a PDF document
   /history         show the conversation so far
   /help            show this guide
   /quit            end the session

Features
   • PDF document analysis
   • Question answering grounded in your document
   • General knowledge fallback
   • Conversational interface";

pub fn banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "📚 PDF Assistant".blue().bold())?;
    writeln!(
        out,
        "{}",
        "Your personal assistant for reading and understanding documents".dimmed()
    )?;
    writeln!(
        out,
        "{}",
        "💡 Type /help for the usage guide, /quit to leave.".dimmed()
    )?;
    writeln!(out)
}

pub fn guide<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", GUIDE)
}

pub fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "{} ", "💭 ›".green().bold())?;
    out.flush()
}

fn label(role: Role) -> ColoredString {
    match role {
        Role::User => USER_LABEL.cyan().bold(),
        Role::Assistant => ASSISTANT_LABEL.magenta().bold(),
    }
}

pub fn message<W: Write>(out: &mut W, message: &Message) -> io::Result<()> {
    let content = match message.role {
        Role::User => message.content.normal(),
        Role::Assistant => message.content.trim_end().normal(),
    };
    writeln!(out, "{}  {}", label(message.role), content)
}

pub fn transcript<W: Write>(out: &mut W, messages: &[Message]) -> io::Result<()> {
    if messages.is_empty() {
        return writeln!(out, "{}", "No messages yet.".dimmed());
    }
    for m in messages {
        message(out, m)?;
    }
    Ok(())
}

pub fn success<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "✅".green(), text.green())
}

pub fn notice<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text.yellow())
}

pub fn error<W: Write>(out: &mut W, err: &anyhow::Error) -> io::Result<()> {
    writeln!(out, "{} {}", "error:".red().bold(), format!("{:#}", err).red())
}

/// Display `tokens` one at a time under the assistant label, appending
/// each one to `answer` as it is written.
///
/// With `live` set, the partial answer is followed by [`CURSOR`]; each new
/// token backs over the cursor and redraws it, and the final render replaces
/// the cursor with a blank. Without it (output is not a terminal) tokens are
/// written as plain text. On a write error `answer` holds the tokens
/// streamed so far.
pub async fn stream_answer<W: Write>(
    out: &mut W,
    tokens: Tokens,
    delay: Duration,
    live: bool,
    answer: &mut String,
) -> io::Result<()> {
    write!(out, "{}  ", label(Role::Assistant))?;
    if live {
        write!(out, "{}", CURSOR)?;
    }
    out.flush()?;

    for token in tokens {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if live {
            write!(out, "\x08{}{}", token, CURSOR)?;
        } else {
            write!(out, "{}", token)?;
        }
        answer.push_str(&token);
        out.flush()?;
    }

    if live {
        writeln!(out, "\x08 ")?;
    } else {
        writeln!(out)?;
    }
    out.flush()
}
