//! In-memory [`VectorStore`] implementation for tests and throwaway sessions.
//!
//! Uses `Vec`s behind `std::sync::RwLock`. Search is brute-force cosine
//! similarity over all stored vectors. Nothing survives the process.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{Chunk, DocumentRecord, ScoredChunk};

use super::{check_batch, top_k, VectorStore};

struct StoredChunk {
    chunk: Chunk,
    document_id: String,
    vector: Vec<f32>,
}

#[derive(Default)]
pub struct InMemoryVectorStore {
    docs: RwLock<Vec<DocumentRecord>>,
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_document(
        &self,
        doc: &DocumentRecord,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        check_batch(chunks, vectors)?;

        let mut stored = self.chunks.write().map_err(poisoned)?;
        for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
            stored.push(StoredChunk {
                chunk: chunk.clone(),
                document_id: doc.id.clone(),
                vector: vector.clone(),
            });
        }
        self.docs.write().map_err(poisoned)?.push(doc.clone());
        Ok(())
    }

    async fn similarity_search(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let stored = self.chunks.read().map_err(poisoned)?;
        let candidates = stored
            .iter()
            .map(|sc| ScoredChunk {
                chunk_id: sc.chunk.id.clone(),
                document_id: sc.document_id.clone(),
                chunk_index: sc.chunk.chunk_index,
                page: sc.chunk.page,
                text: sc.chunk.text.clone(),
                score: cosine_similarity(query_vec, &sc.vector) as f64,
            })
            .collect();
        Ok(top_k(candidates, k))
    }

    async fn chunk_count(&self) -> Result<usize> {
        Ok(self.chunks.read().map_err(poisoned)?.len())
    }

    async fn documents(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.docs.read().map_err(poisoned)?.clone())
    }

    async fn persist(&self) -> Result<()> {
        Ok(())
    }
}
