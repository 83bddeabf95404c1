//! Vector store abstraction.
//!
//! The [`VectorStore`] trait covers what the ingestor and the retriever need:
//! insert a document's chunks with their embeddings, persist, and look up
//! the nearest chunks to a query vector. Two backends exist:
//!
//! | Backend | Module | Use |
//! |---------|--------|-----|
//! | SQLite file | [`crate::sqlite_store`] | The on-disk store used by the app |
//! | In-memory | [`memory`] | Tests and throwaway sessions |
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Chunk, DocumentRecord, ScoredChunk};

pub use memory::InMemoryVectorStore;

/// Shared handle to a populated store, as kept in the session.
pub type VectorStoreHandle = Arc<dyn VectorStore>;

/// Abstract storage backend for embedded chunks.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`add_document`](VectorStore::add_document) | Insert a document's chunks and vectors |
/// | [`similarity_search`](VectorStore::similarity_search) | Top-k chunks by cosine similarity |
/// | [`chunk_count`](VectorStore::chunk_count) | Number of stored chunks |
/// | [`documents`](VectorStore::documents) | Ingested document records |
/// | [`persist`](VectorStore::persist) | Flush to durable storage |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert every chunk of `doc` together with its embedding.
    ///
    /// `vectors[i]` is the embedding of `chunks[i]`; the lengths must match.
    async fn add_document(
        &self,
        doc: &DocumentRecord,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<()>;

    /// Return up to `k` chunks ordered by descending similarity.
    async fn similarity_search(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    async fn chunk_count(&self) -> Result<usize>;

    async fn documents(&self) -> Result<Vec<DocumentRecord>>;

    /// Make every prior write durable.
    async fn persist(&self) -> Result<()>;
}

/// Reject mismatched chunk/vector batches before touching storage.
pub(crate) fn check_batch(chunks: &[Chunk], vectors: &[Vec<f32>]) -> Result<()> {
    if chunks.len() != vectors.len() {
        anyhow::bail!(
            "chunk/vector count mismatch: {} chunks, {} vectors",
            chunks.len(),
            vectors.len()
        );
    }
    Ok(())
}

/// Sort candidates by descending score and keep the best `k`.
pub(crate) fn top_k(mut candidates: Vec<ScoredChunk>, k: usize) -> Vec<ScoredChunk> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.chunk_index.cmp(&b.chunk_index))
    });
    candidates.truncate(k);
    candidates
}
