//! Question answering in retrieval or direct mode.
//!
//! With a vector store present, the [`Responder`] retrieves the top-k chunks
//! for the question, fills the prompt template and asks the generation
//! handle. Without a store, the raw question goes straight to the model.
//!
//! [`Responder::answer`] reports failures as a [`ResponseError`];
//! [`Responder::respond`] is the presentation-facing entry point and never
//! fails: errors become a single diagnostic token.

use std::sync::Arc;

use thiserror::Error;

use crate::config::RetrievalConfig;
use crate::prompt::{stuff_context, PromptTemplate};
use crate::provider::ModelProvider;
use crate::retriever::Retriever;
use crate::store::VectorStore;

/// Prefix of the single token emitted when answering fails.
pub const WARNING_PREFIX: &str = "⚠️ An error occurred: ";

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("{0}")]
    Retrieval(anyhow::Error),
    #[error("{0}")]
    Generation(anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    Retrieval,
    Direct,
}

/// A finite, single-use sequence of display tokens.
///
/// Each token is one whitespace-delimited word followed by a space. The
/// whole answer already exists when the sequence is created; iterating only
/// paces its display.
#[derive(Debug)]
pub struct Tokens {
    inner: std::vec::IntoIter<String>,
}

impl Tokens {
    pub fn from_answer(answer: &str) -> Self {
        let words: Vec<String> = answer
            .split_whitespace()
            .map(|w| format!("{} ", w))
            .collect();
        Self {
            inner: words.into_iter(),
        }
    }

    /// A one-token sequence carrying an error message.
    pub fn diagnostic(message: &str) -> Self {
        Self {
            inner: vec![format!("{}{}", WARNING_PREFIX, message)].into_iter(),
        }
    }
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Tokens {}

pub struct Responder {
    provider: Arc<ModelProvider>,
    template: PromptTemplate,
    top_k: usize,
}

impl Responder {
    pub fn new(provider: Arc<ModelProvider>, retrieval: &RetrievalConfig) -> Self {
        let template = retrieval
            .prompt_template
            .as_deref()
            .map(PromptTemplate::new)
            .unwrap_or_default();
        Self {
            provider,
            template,
            top_k: retrieval.top_k,
        }
    }

    pub fn mode_for(store: Option<&dyn VectorStore>) -> AnswerMode {
        match store {
            Some(_) => AnswerMode::Retrieval,
            None => AnswerMode::Direct,
        }
    }

    /// Produce the complete answer for `question`.
    pub async fn answer(
        &self,
        question: &str,
        store: Option<&dyn VectorStore>,
    ) -> Result<String, ResponseError> {
        let mode = Self::mode_for(store);
        tracing::info!(?mode, question_chars = question.len(), "answering question");

        let handles = self
            .provider
            .handles()
            .await
            .map_err(ResponseError::Generation)?;

        let prompt = match store {
            Some(store) => {
                let retriever = Retriever::new(store, handles.embedder.as_ref(), self.top_k);
                let hits = retriever
                    .retrieve(question)
                    .await
                    .map_err(ResponseError::Retrieval)?;
                self.template.render(&stuff_context(&hits), question)
            }
            None => question.to_string(),
        };

        handles
            .generator
            .generate(&prompt)
            .await
            .map_err(ResponseError::Generation)
    }

    /// Answer `question` as a token sequence; failures become one
    /// diagnostic token.
    pub async fn respond(&self, question: &str, store: Option<&dyn VectorStore>) -> Tokens {
        match self.answer(question, store).await {
            Ok(answer) => Tokens::from_answer(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "answer failed");
                Tokens::diagnostic(&e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::provider::ModelHandles;
    use crate::store::InMemoryVectorStore;
    use crate::test_support::{FailingEmbedder, MockEmbedder, MockGenerator};

    fn responder_with(generator: Arc<MockGenerator>, embedder: Arc<dyn crate::embedding::Embedder>) -> Responder {
        let handles = ModelHandles {
            generator,
            embedder,
        };
        let provider = Arc::new(ModelProvider::with_handles(ModelConfig::default(), handles));
        Responder::new(provider, &RetrievalConfig::default())
    }

    #[test]
    fn test_tokens_from_answer() {
        let tokens: Vec<String> = Tokens::from_answer("Paris is the capital of France").collect();
        assert_eq!(
            tokens,
            vec!["Paris ", "is ", "the ", "capital ", "of ", "France "]
        );
    }

    #[test]
    fn test_tokens_collapse_whitespace() {
        let tokens: Vec<String> = Tokens::from_answer("  a\n\nb\tc  ").collect();
        assert_eq!(tokens, vec!["a ", "b ", "c "]);
        assert_eq!(Tokens::from_answer("   ").count(), 0);
    }

    #[test]
    fn test_tokens_are_single_use() {
        let mut tokens = Tokens::from_answer("one two");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.by_ref().count(), 2);
        assert_eq!(tokens.next(), None);
    }

    #[tokio::test]
    async fn test_direct_mode_sends_raw_question() {
        let generator = Arc::new(MockGenerator::answering("Paris is the capital of France"));
        let responder = responder_with(generator.clone(), Arc::new(MockEmbedder::default()));

        let tokens: Vec<String> = responder
            .respond("What is the capital of France?", None)
            .await
            .collect();

        assert_eq!(
            tokens,
            vec!["Paris ", "is ", "the ", "capital ", "of ", "France "]
        );
        assert_eq!(generator.prompts(), vec!["What is the capital of France?"]);
    }

    #[tokio::test]
    async fn test_retrieval_mode_sends_context_and_question() {
        let store = InMemoryVectorStore::new();
        crate::test_support::seed_store(&store, &["The Eiffel Tower is in Paris."]).await;

        let generator = Arc::new(MockGenerator::answering("In Paris."));
        let responder = responder_with(generator.clone(), Arc::new(MockEmbedder::default()));

        let answer = responder
            .answer("Where is the Eiffel Tower?", Some(&store))
            .await
            .unwrap();
        assert_eq!(answer, "In Paris.");

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context: The Eiffel Tower is in Paris."));
        assert!(prompts[0].contains("Question: Where is the Eiffel Tower?"));
    }

    #[tokio::test]
    async fn test_generation_error_becomes_single_token() {
        let generator = Arc::new(MockGenerator::failing("connection refused"));
        let responder = responder_with(generator, Arc::new(MockEmbedder::default()));

        let tokens: Vec<String> = responder.respond("hello", None).await.collect();
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].starts_with(WARNING_PREFIX));
        assert!(tokens[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_retrieval_error_is_reported_and_generator_not_called() {
        let store = InMemoryVectorStore::new();
        let generator = Arc::new(MockGenerator::answering("unused"));
        let responder = responder_with(generator.clone(), Arc::new(FailingEmbedder));

        let err = responder.answer("q", Some(&store)).await.unwrap_err();
        assert!(matches!(err, ResponseError::Retrieval(_)));
        assert!(generator.prompts().is_empty());
    }

    #[test]
    fn test_custom_template_is_used() {
        let provider = Arc::new(ModelProvider::new(ModelConfig::default()));
        let retrieval = RetrievalConfig {
            top_k: 2,
            prompt_template: Some("{context}|{input}".to_string()),
        };
        let responder = Responder::new(provider, &retrieval);
        assert_eq!(responder.template.render("a", "b"), "a|b");
        assert_eq!(responder.top_k, 2);
    }
}
