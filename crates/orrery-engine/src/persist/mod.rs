//! Remote document persistence.
//!
//! A [`DocumentStore`] reads and writes whole JSON documents addressed by a
//! [`DocumentPath`] (collection + id). Writes fully replace the document.
//! Browser builds talk to Firestore over `fetch` (see `orrery-web`); tests and
//! offline builds use [`MemoryStore`].

pub mod firestore;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

/// Errors raised by a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (network, CORS, aborted).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status (auth, quota, ...).
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The server's document did not have the expected shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store refused the operation (offline, injected failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Address of one document: `collection/id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    pub collection: String,
    pub id: String,
}

impl DocumentPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Whole-document key-value store.
///
/// Futures are not `Send`: every implementation runs on the browser's single
/// thread (or a test executor).
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Replace the document at `path` with `body`.
    async fn write(&self, path: &DocumentPath, body: &Value) -> Result<(), StoreError>;

    /// Fetch the document at `path`. `Ok(None)` when it does not exist.
    async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, StoreError>;
}

/// In-memory document store.
///
/// Clones share the same documents, so a second handle sees what the first
/// one wrote (a fresh session against the same backend). Failures can be
/// injected per direction.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Rc<RefCell<HashMap<DocumentPath, Value>>>,
    fail_writes: Rc<Cell<bool>>,
    fail_reads: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    /// Insert a document directly, bypassing failure injection.
    pub fn insert(&self, path: DocumentPath, body: Value) {
        self.docs.borrow_mut().insert(path, body);
    }

    /// Current document at `path`, if any.
    pub fn get(&self, path: &DocumentPath) -> Option<Value> {
        self.docs.borrow().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.borrow().is_empty()
    }
}

impl DocumentStore for MemoryStore {
    async fn write(&self, path: &DocumentPath, body: &Value) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable(format!("write to {path} rejected")));
        }
        self.docs.borrow_mut().insert(path.clone(), body.clone());
        Ok(())
    }

    async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, StoreError> {
        if self.fail_reads.get() {
            return Err(StoreError::Unavailable(format!("read of {path} rejected")));
        }
        Ok(self.docs.borrow().get(path).cloned())
    }
}
