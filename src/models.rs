//! Core data models used throughout the assistant.
//!
//! These types represent the chunks, retrieval hits, and chat messages that
//! flow between the ingestor, the vector store, and the responder.

use serde::{Deserialize, Serialize};

/// A span of extracted document text.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub chunk_index: i64,
    /// 1-based page on which the chunk's first character appears.
    pub page: u32,
    pub text: String,
    /// SHA-256 of `text`, hex encoded.
    pub hash: String,
}

/// A chunk returned by a nearest-neighbour lookup.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub chunk_index: i64,
    pub page: u32,
    pub text: String,
    /// Cosine similarity to the query vector.
    pub score: f64,
}

/// Summary of an ingested document as recorded in the store.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: String,
    pub file_name: String,
    pub page_count: u32,
    pub chunk_count: u32,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
