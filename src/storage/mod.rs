pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a document store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document in {collection} at line {line}: {source}")]
    Decode {
        collection: &'static str,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("collection lock poisoned: {0}")]
    Poisoned(&'static str),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// A record that lives in a named collection and is keyed by a string id.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the document is stored in
    const COLLECTION: &'static str;

    /// Current id, `None` when the document has not been persisted yet.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);
}

/// Generic collection operations every backend provides.
///
/// `save` is an upsert: a document whose id already exists replaces the
/// stored one in place, anything else is appended. `delete_by_id` on a
/// missing id succeeds without touching the collection.
pub trait DocumentStore<D: Document>: Send + Sync {
    /// All documents in insertion order
    fn find_all(&self) -> Result<Vec<D>>;

    fn find_by_id(&self, id: &str) -> Result<Option<D>> {
        Ok(self.find_all()?.into_iter().find(|d| d.id() == Some(id)))
    }

    /// Insert or replace `doc`, assigning an id first when it has none.
    fn save(&self, doc: D) -> Result<D>;

    fn delete_by_id(&self, id: &str) -> Result<()>;

    fn count(&self) -> Result<usize> {
        Ok(self.find_all()?.len())
    }
}

/// Give `doc` a fresh id unless it already carries a non-empty one.
pub(crate) fn ensure_id<D: Document>(doc: &mut D) {
    let missing = doc.id().map_or(true, str::is_empty);
    if missing {
        doc.set_id(Uuid::new_v4().simple().to_string());
    }
}

/// Replace the document with the same id, or append. Shared by the backends.
pub(crate) fn upsert<D: Document>(docs: &mut Vec<D>, doc: D) {
    let position = docs.iter().position(|d| d.id() == doc.id());
    match position {
        Some(i) => docs[i] = doc,
        None => docs.push(doc),
    }
}
