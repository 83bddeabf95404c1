//! Document ingestion pipeline.
//!
//! Coordinates the upload flow: PDF bytes → page text → chunks → embeddings
//! → vector store. Every failure propagates to the caller; nothing is
//! retried and a failed upload leaves the session without a document.
//!
//! The store lives at a fixed on-disk path, so documents ingested by earlier
//! sessions stay searchable alongside the new one.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use crate::chunk::chunk_pages;
use crate::config::{ChunkingConfig, Config};
use crate::extract::extract_pdf_pages;
use crate::models::{Chunk, DocumentRecord};
use crate::progress::{IngestProgressEvent, IngestProgressReporter, NoProgress};
use crate::provider::ModelProvider;
use crate::session::Session;
use crate::sqlite_store::SqliteVectorStore;
use crate::store::{InMemoryVectorStore, VectorStore, VectorStoreHandle};

/// Where an upload's chunks are written.
#[derive(Debug, Clone)]
pub enum StoreLocation {
    /// SQLite file at a fixed path, shared by every session.
    Disk(PathBuf),
    /// Process-local store; nothing survives the session.
    Memory,
}

impl StoreLocation {
    pub async fn open(&self) -> Result<VectorStoreHandle> {
        match self {
            StoreLocation::Disk(path) => {
                let store = SqliteVectorStore::open(path)
                    .await
                    .with_context(|| format!("Failed to open vector store at {}", path.display()))?;
                Ok(Arc::new(store))
            }
            StoreLocation::Memory => Ok(Arc::new(InMemoryVectorStore::new())),
        }
    }
}

/// Summary of one successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub document: DocumentRecord,
    /// Total chunks in the store after ingestion, across all documents.
    pub store_chunks: usize,
}

#[derive(Debug)]
pub enum UploadOutcome {
    Ingested(IngestReport),
    /// The session already holds a document; the upload was not read.
    Ignored,
}

/// A document ready to be written: chunks paired with their vectors.
struct PreparedDocument {
    document: DocumentRecord,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    started: Instant,
}

pub struct Ingestor {
    provider: Arc<ModelProvider>,
    chunking: ChunkingConfig,
    batch_size: usize,
    location: StoreLocation,
    progress: Box<dyn IngestProgressReporter>,
}

impl Ingestor {
    pub fn new(provider: Arc<ModelProvider>, config: &Config) -> Self {
        Self {
            provider,
            chunking: config.chunking.clone(),
            batch_size: config.model.batch_size.max(1),
            location: StoreLocation::Disk(config.store.path.clone()),
            progress: Box::new(NoProgress),
        }
    }

    pub fn with_location(mut self, location: StoreLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn IngestProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Ingest `bytes` into a freshly opened store and return its handle.
    ///
    /// The store is only opened once the document has been extracted,
    /// chunked and embedded, so a rejected upload leaves nothing on disk.
    pub async fn ingest_pdf(
        &self,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<(VectorStoreHandle, IngestReport)> {
        let prepared = self.prepare(bytes, file_name).await?;
        let store = self.location.open().await?;
        let report = self.write(prepared, store.as_ref()).await?;
        Ok((store, report))
    }

    /// Handle a session upload: ingest on the first one, ignore later ones.
    pub async fn upload(
        &self,
        session: &mut Session,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<UploadOutcome> {
        if session.has_document() {
            tracing::info!(file = file_name, "document already loaded, ignoring upload");
            return Ok(UploadOutcome::Ignored);
        }

        let (store, report) = self.ingest_pdf(bytes, file_name).await?;
        session.set_vector_store(store);
        Ok(UploadOutcome::Ingested(report))
    }

    /// Extract, chunk and embed without touching any store.
    async fn prepare(&self, bytes: &[u8], file_name: &str) -> Result<PreparedDocument> {
        let started = Instant::now();
        self.progress.report(IngestProgressEvent::Extracting {
            file: file_name.to_string(),
        });

        // pdf-extract is synchronous and may panic on hostile input.
        let owned = bytes.to_vec();
        let pages = tokio::task::spawn_blocking(move || extract_pdf_pages(&owned))
            .await
            .context("PDF extraction task failed")?
            .with_context(|| format!("Failed to extract text from {}", file_name))?;

        let chunks = chunk_pages(
            &pages,
            self.chunking.chunk_size,
            self.chunking.chunk_overlap,
        );
        if chunks.is_empty() {
            bail!("{} produced no chunks", file_name);
        }
        self.progress.report(IngestProgressEvent::Chunked {
            pages: pages.len() as u32,
            chunks: chunks.len() as u64,
        });

        let vectors = self.embed_chunks(&chunks).await?;

        let document = DocumentRecord {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.to_string(),
            page_count: pages.len() as u32,
            chunk_count: chunks.len() as u32,
            created_at: chrono::Utc::now().timestamp(),
        };

        Ok(PreparedDocument {
            document,
            chunks,
            vectors,
            started,
        })
    }

    async fn write(
        &self,
        prepared: PreparedDocument,
        store: &dyn VectorStore,
    ) -> Result<IngestReport> {
        let PreparedDocument {
            document,
            chunks,
            vectors,
            started,
        } = prepared;

        self.progress.report(IngestProgressEvent::Persisting);
        store
            .add_document(&document, &chunks, &vectors)
            .await
            .context("Failed to write chunks to vector store")?;
        store
            .persist()
            .await
            .context("Failed to persist vector store")?;

        let store_chunks = store.chunk_count().await?;
        tracing::info!(
            file = %document.file_name,
            pages = document.page_count,
            chunks = document.chunk_count,
            store_chunks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "document ingested"
        );

        Ok(IngestReport {
            document,
            store_chunks,
        })
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let embedder = self.provider.embedder().await?;
        let total = chunks.len() as u64;
        let mut vectors = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let batch_vectors = embedder
                .embed(&texts)
                .await
                .with_context(|| format!("Failed to embed chunks with {}", embedder.model_name()))?;
            if batch_vectors.len() != batch.len() {
                bail!(
                    "Embedder returned {} vectors for {} chunks",
                    batch_vectors.len(),
                    batch.len()
                );
            }
            vectors.extend(batch_vectors);
            self.progress.report(IngestProgressEvent::Embedding {
                n: vectors.len() as u64,
                total,
            });
        }

        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::{join_pages, reassemble};
    use crate::config::ModelConfig;
    use crate::provider::ModelHandles;
    use crate::test_support::{minimal_pdf, FailingEmbedder, MockEmbedder, MockGenerator};
    use std::sync::Mutex;

    struct Recording(Arc<Mutex<Vec<IngestProgressEvent>>>);

    impl IngestProgressReporter for Recording {
        fn report(&self, event: IngestProgressEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    fn provider_with(embedder: Arc<dyn crate::embedding::Embedder>) -> Arc<ModelProvider> {
        let handles = ModelHandles {
            generator: Arc::new(MockGenerator::answering("unused")),
            embedder,
        };
        Arc::new(ModelProvider::with_handles(ModelConfig::default(), handles))
    }

    fn memory_ingestor(embedder: Arc<dyn crate::embedding::Embedder>) -> Ingestor {
        Ingestor::new(provider_with(embedder), &Config::default())
            .with_location(StoreLocation::Memory)
    }

    #[tokio::test]
    async fn test_ingest_reconstructs_extracted_text() {
        let pdf = minimal_pdf(&["The quick brown fox jumps over the lazy dog"]);
        let ingestor = memory_ingestor(Arc::new(MockEmbedder::default()));

        let (store, report) = ingestor.ingest_pdf(&pdf, "fox.pdf").await.unwrap();
        assert!(report.document.chunk_count >= 1);
        assert_eq!(report.document.page_count, 1);
        assert_eq!(store.chunk_count().await.unwrap(), report.store_chunks);

        let (expected, _) = join_pages(&extract_pdf_pages(&pdf).unwrap());
        let mut hits = store
            .similarity_search(&crate::test_support::letter_vector("fox"), usize::MAX)
            .await
            .unwrap();
        assert!(hits.iter().any(|h| h.text.contains("quick brown fox")));

        hits.sort_by_key(|h| h.chunk_index);
        let stored: Vec<Chunk> = hits
            .into_iter()
            .map(|h| Chunk {
                id: h.chunk_id,
                chunk_index: h.chunk_index,
                page: h.page,
                text: h.text,
                hash: String::new(),
            })
            .collect();
        assert_eq!(reassemble(&stored, 128), expected);
    }

    #[tokio::test]
    async fn test_long_document_embeds_in_batches() {
        let long_page = "lorem ipsum dolor sit amet ".repeat(80);
        let pdf = minimal_pdf(&[long_page.as_str(), long_page.as_str()]);
        let embedder = Arc::new(MockEmbedder::default());
        let events = Arc::new(Mutex::new(Vec::new()));

        let mut config = Config::default();
        config.model.batch_size = 2;
        let ingestor = Ingestor::new(provider_with(embedder.clone()), &config)
            .with_location(StoreLocation::Memory)
            .with_progress(Box::new(Recording(events.clone())));

        let (_store, report) = ingestor.ingest_pdf(&pdf, "long.pdf").await.unwrap();
        let chunks = report.document.chunk_count as usize;
        assert!(chunks > 2);
        assert_eq!(embedder.calls(), chunks.div_ceil(2));

        let events = events.lock().unwrap();
        assert!(matches!(events[0], IngestProgressEvent::Extracting { .. }));
        assert_eq!(
            events.last(),
            Some(&IngestProgressEvent::Persisting)
        );
        assert!(events.contains(&IngestProgressEvent::Embedding {
            n: chunks as u64,
            total: chunks as u64
        }));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_fails() {
        let ingestor = memory_ingestor(Arc::new(MockEmbedder::default()));
        let mut session = Session::new();
        let err = ingestor
            .upload(&mut session, b"hello world", "notes.txt")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not a PDF"));
        assert!(!session.has_document());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let pdf = minimal_pdf(&["some text"]);
        let ingestor = memory_ingestor(Arc::new(FailingEmbedder));
        let mut session = Session::new();
        let err = ingestor.upload(&mut session, &pdf, "a.pdf").await.unwrap_err();
        assert!(format!("{:#}", err).contains("embedding service unavailable"));
        assert!(!session.has_document());
    }

    #[tokio::test]
    async fn test_second_upload_is_ignored() {
        let pdf = minimal_pdf(&["first document"]);
        let ingestor = memory_ingestor(Arc::new(MockEmbedder::default()));
        let mut session = Session::new();

        let first = ingestor.upload(&mut session, &pdf, "a.pdf").await.unwrap();
        assert!(matches!(first, UploadOutcome::Ingested(_)));
        let held = session.vector_store_handle().unwrap().clone();

        // Not even parsed: invalid bytes are fine once a document is loaded.
        let second = ingestor.upload(&mut session, b"junk", "b.pdf").await.unwrap();
        assert!(matches!(second, UploadOutcome::Ignored));
        assert!(Arc::ptr_eq(session.vector_store_handle().unwrap(), &held));
    }

    #[tokio::test]
    async fn test_disk_store_is_extended_across_sessions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("db").join("store.sqlite");
        let provider = provider_with(Arc::new(MockEmbedder::default()));
        let ingestor = Ingestor::new(provider, &Config::default())
            .with_location(StoreLocation::Disk(path.clone()));

        let (_, first) = ingestor
            .ingest_pdf(&minimal_pdf(&["alpha"]), "a.pdf")
            .await
            .unwrap();
        let (store, second) = ingestor
            .ingest_pdf(&minimal_pdf(&["beta"]), "b.pdf")
            .await
            .unwrap();

        assert!(path.exists());
        assert_eq!(
            second.store_chunks,
            (first.document.chunk_count + second.document.chunk_count) as usize
        );
        assert_eq!(store.documents().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_upload_creates_no_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("db").join("store.sqlite");
        let ingestor = memory_ingestor(Arc::new(MockEmbedder::default()))
            .with_location(StoreLocation::Disk(path.clone()));
        let mut session = Session::new();

        let err = ingestor
            .upload(&mut session, b"plain text", "notes.txt")
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not a PDF"));
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_embedding_failure_creates_no_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("store.sqlite");
        let ingestor = memory_ingestor(Arc::new(FailingEmbedder))
            .with_location(StoreLocation::Disk(path.clone()));

        assert!(ingestor
            .ingest_pdf(&minimal_pdf(&["some text"]), "a.pdf")
            .await
            .is_err());
        assert!(!path.exists());
    }
}
