//! Query-side retrieval: embed the question, return the nearest chunks.

use anyhow::Result;

use crate::embedding::{embed_query, Embedder};
use crate::models::ScoredChunk;
use crate::store::VectorStore;

/// A retriever bound to one store and one embedding handle.
pub struct Retriever<'a> {
    store: &'a dyn VectorStore,
    embedder: &'a dyn Embedder,
    k: usize,
}

impl<'a> Retriever<'a> {
    pub fn new(store: &'a dyn VectorStore, embedder: &'a dyn Embedder, k: usize) -> Self {
        Self {
            store,
            embedder,
            k: k.max(1),
        }
    }

    pub async fn retrieve(&self, question: &str) -> Result<Vec<ScoredChunk>> {
        let query_vec = embed_query(self.embedder, question).await?;
        let hits = self.store.similarity_search(&query_vec, self.k).await?;
        tracing::debug!(
            k = self.k,
            hits = hits.len(),
            best_score = hits.first().map(|h| h.score).unwrap_or(0.0),
            "retrieved context"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVectorStore;
    use crate::test_support::{seed_store, MockEmbedder};

    #[tokio::test]
    async fn test_retrieve_ranks_closest_chunk_first() {
        let store = InMemoryVectorStore::new();
        seed_store(&store, &["zzzz zzz zz", "apples and bananas", "qqq xxx"]).await;
        let embedder = MockEmbedder::default();

        let hits = Retriever::new(&store, &embedder, 2)
            .retrieve("bananas")
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "apples and bananas");
    }

    #[tokio::test]
    async fn test_zero_k_is_raised_to_one() {
        let store = InMemoryVectorStore::new();
        seed_store(&store, &["one", "two"]).await;
        let embedder = MockEmbedder::default();

        let hits = Retriever::new(&store, &embedder, 0)
            .retrieve("one")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
}
