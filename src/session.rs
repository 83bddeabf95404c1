//! Per-session state: the document's vector store and the transcript.
//!
//! A [`Session`] is owned by the presentation loop and passed by `&mut` into
//! every handler. The store handle is write-once; the transcript only grows.

use crate::models::{Message, Role};
use crate::store::{VectorStore, VectorStoreHandle};

#[derive(Default)]
pub struct Session {
    vector_store: Option<VectorStoreHandle>,
    transcript: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vector_store(&self) -> Option<&dyn VectorStore> {
        self.vector_store.as_deref()
    }

    pub fn vector_store_handle(&self) -> Option<&VectorStoreHandle> {
        self.vector_store.as_ref()
    }

    /// Install the session's store. Returns `false` and leaves the existing
    /// handle untouched when one is already present.
    pub fn set_vector_store(&mut self, store: VectorStoreHandle) -> bool {
        if self.vector_store.is_some() {
            return false;
        }
        self.vector_store = Some(store);
        true
    }

    pub fn has_document(&self) -> bool {
        self.vector_store.is_some()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        debug_assert!(self.expects(Role::User));
        self.transcript.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        debug_assert!(self.expects(Role::Assistant));
        self.transcript.push(Message::assistant(content));
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Whether the next appended message should carry `role`.
    fn expects(&self, role: Role) -> bool {
        let next = match self.transcript.last() {
            None | Some(Message { role: Role::Assistant, .. }) => Role::User,
            Some(Message { role: Role::User, .. }) => Role::Assistant,
        };
        next == role
    }
}
