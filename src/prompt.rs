//! Prompt template with two named slots: retrieved context and question.

use crate::models::ScoredChunk;

pub const CONTEXT_SLOT: &str = "{context}";
pub const INPUT_SLOT: &str = "{input}";

/// Separator between retrieved chunks when they are stuffed into the prompt.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

pub const DEFAULT_TEMPLATE: &str = "Answer the following question based on the provided context.
If the question cannot be answered from the context, give a general answer based on your own knowledge.

Context: {context}
Question: {input}

Answer: ";

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill both slots in a single pass over the template, so slot-like text
    /// inside the context or the question is never expanded.
    pub fn render(&self, context: &str, input: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + context.len() + input.len());
        let mut rest = self.template.as_str();

        loop {
            let next = [(CONTEXT_SLOT, context), (INPUT_SLOT, input)]
                .into_iter()
                .filter_map(|(slot, value)| rest.find(slot).map(|pos| (pos, slot, value)))
                .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, slot, value)) => {
                    out.push_str(&rest[..pos]);
                    out.push_str(value);
                    rest = &rest[pos + slot.len()..];
                }
                None => {
                    out.push_str(rest);
                    break;
                }
            }
        }

        out
    }
}

/// Concatenate retrieved chunk texts in rank order.
pub fn stuff_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(DOCUMENT_SEPARATOR)
}
