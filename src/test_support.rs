//! Test fixtures: hand-built PDFs and mock model handles.
//!
//! Compiled into the unit tests and included by `tests/common` so the
//! integration tests share one copy.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use pdf_assistant::chunk::chunk_text;
use pdf_assistant::embedding::Embedder;
use pdf_assistant::generation::Generator;
use pdf_assistant::models::DocumentRecord;
use pdf_assistant::store::VectorStore;

/// Build a PDF with one page per entry of `pages`, each showing its text in
/// Helvetica. Cross-reference offsets are computed from the actual bytes.
pub fn minimal_pdf(pages: &[&str]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", 4 + 2 * i))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());
    for (i, text) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R /Resources << /Font << /F1 3 0 R >> >> >>",
            5 + 2 * i
        ));
        let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ));
    }

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj {} endobj\n", i + 1, body).as_bytes());
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer << /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}

/// Generator returning a canned answer (or error) and recording prompts.
pub struct MockGenerator {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            reply: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn model_name(&self) -> &str {
        "mock-generator"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(answer) => Ok(answer.clone()),
            Err(message) => bail!("{}", message),
        }
    }
}

/// Letter-frequency embedder: similar texts get similar vectors.
#[derive(Default)]
pub struct MockEmbedder {
    calls: Mutex<usize>,
}

impl MockEmbedder {
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

pub fn letter_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 27];
    for c in text.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() {
            v[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    // Keeps the vector non-zero for text without letters.
    v[26] = 1.0;
    v
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn model_name(&self) -> &str {
        "mock-embedder"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        *self.calls.lock().unwrap() += 1;
        Ok(texts.iter().map(|t| letter_vector(t)).collect())
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing-embedder"
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        bail!("embedding service unavailable")
    }
}

/// Store each text as a one-chunk document embedded with [`letter_vector`].
pub async fn seed_store(store: &dyn VectorStore, texts: &[&str]) {
    for (i, text) in texts.iter().enumerate() {
        let chunks = chunk_text(text, 512, 128);
        let vectors: Vec<Vec<f32>> = chunks.iter().map(|c| letter_vector(&c.text)).collect();
        let doc = DocumentRecord {
            id: format!("doc-{}", i),
            file_name: format!("doc-{}.pdf", i),
            page_count: 1,
            chunk_count: chunks.len() as u32,
            created_at: 0,
        };
        store.add_document(&doc, &chunks, &vectors).await.unwrap();
    }
}
