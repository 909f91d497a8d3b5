use super::{ensure_id, upsert, Document, DocumentStore, Result, StorageError};
use std::sync::RwLock;
use tracing::debug;

/// In-process collection, lost on restart.
pub struct MemoryStore<D> {
    docs: RwLock<Vec<D>>,
}

impl<D: Document> MemoryStore<D> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }
}

impl<D: Document> Default for MemoryStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> DocumentStore<D> for MemoryStore<D> {
    fn find_all(&self) -> Result<Vec<D>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        Ok(docs.clone())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<D>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        Ok(docs.iter().find(|d| d.id() == Some(id)).cloned())
    }

    fn save(&self, mut doc: D) -> Result<D> {
        ensure_id(&mut doc);
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        upsert(&mut docs, doc.clone());

        debug!(collection = D::COLLECTION, id = ?doc.id(), "Saved document");
        Ok(doc)
    }

    fn delete_by_id(&self, id: &str) -> Result<()> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        docs.retain(|d| d.id() != Some(id));
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let docs = self
            .docs
            .read()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        Ok(docs.len())
    }
}
