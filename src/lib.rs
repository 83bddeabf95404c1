//! # PDF Assistant
//!
//! A local-first assistant that answers questions about a PDF document.
//!
//! A PDF uploaded into a session is split into overlapping chunks, embedded
//! through a local Ollama instance and stored in a SQLite vector store.
//! Questions are then answered by retrieval-augmented generation; without a
//! document, the model answers directly from general knowledge.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌─────────────┐
//! │  Upload  │──▶│  Ingestor  │──▶│ VectorStore │
//! │   PDF    │   │ Chunk+Embed│   │  (SQLite)   │
//! └──────────┘   └────────────┘   └──────┬──────┘
//!                                        │
//!                ┌────────────┐   ┌──────▼──────┐
//!   question ───▶│ Responder  │◀──│  Retriever  │
//!                │  (Ollama)  │   └─────────────┘
//!                └─────┬──────┘
//!                      ▼
//!                streamed tokens
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`provider`] | Lazily-built shared model handles |
//! | [`extract`] | PDF text extraction |
//! | [`chunk`] | Fixed-window text chunking |
//! | [`embedding`] | Embedding handle abstraction |
//! | [`generation`] | Text-generation handle abstraction |
//! | [`store`] | Vector store trait and in-memory backend |
//! | [`sqlite_store`] | SQLite vector store |
//! | [`ingest`] | Upload → store pipeline |
//! | [`retriever`] | Top-k chunk lookup |
//! | [`prompt`] | Prompt template |
//! | [`responder`] | Retrieval or direct answering |
//! | [`session`] | Per-session state |
//! | [`chat`] | Interactive chat loop |
//! | [`ui`] | Terminal rendering |

pub mod chat;
pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod extract;
pub mod generation;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod prompt;
pub mod provider;
pub mod responder;
pub mod retriever;
pub mod session;
pub mod sqlite_store;
pub mod store;
pub mod ui;

// Lets `test_support` name the crate the same way from unit and
// integration tests.
#[cfg(test)]
extern crate self as pdf_assistant;

#[cfg(test)]
mod test_support;
