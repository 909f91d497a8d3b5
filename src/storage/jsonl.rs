use super::{ensure_id, upsert, Document, DocumentStore, Result, StorageError};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// JSON-lines backed collection.
///
/// One file per collection (`<data_dir>/<collection>.jsonl`), one document per
/// line. The whole collection is cached in memory and the file is rewritten
/// through a temp file + rename after every mutation.
pub struct JsonlStore<D> {
    path: PathBuf,
    docs: Mutex<Vec<D>>,
}

impl<D: Document> JsonlStore<D> {
    /// Open (or create) the collection file under `data_dir`
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|e| io_error(data_dir, e))?;

        let path = data_dir.join(format!("{}.jsonl", D::COLLECTION));
        let docs = if path.exists() {
            Self::load(&path)?
        } else {
            Vec::new()
        };

        info!(
            path = %path.display(),
            documents = docs.len(),
            "Opened JSONL collection"
        );

        Ok(Self {
            path,
            docs: Mutex::new(docs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<Vec<D>> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let mut docs = Vec::new();

        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| io_error(path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: D = serde_json::from_str(&line).map_err(|source| StorageError::Decode {
                collection: D::COLLECTION,
                line: i + 1,
                source,
            })?;
            // Files written by hand may repeat an id; the last line wins.
            upsert(&mut docs, doc);
        }

        Ok(docs)
    }

    fn persist(&self, docs: &[D]) -> Result<()> {
        let tmp = self.path.with_extension("jsonl.tmp");
        let written = Self::write_synced(&tmp, docs)
            .and_then(|()| fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e)));

        if written.is_err() {
            // Best effort; the original error is the one worth reporting.
            let _ = fs::remove_file(&tmp);
        }
        written
    }

    /// Write every document to `path` and fsync it, so a rename never
    /// exposes a partially written file.
    fn write_synced(path: &Path, docs: &[D]) -> Result<()> {
        let file = File::create(path).map_err(|e| io_error(path, e))?;
        let mut writer = BufWriter::new(file);
        for doc in docs {
            serde_json::to_writer(&mut writer, doc)?;
            writer.write_all(b"\n").map_err(|e| io_error(path, e))?;
        }
        writer.flush().map_err(|e| io_error(path, e))?;
        writer.get_ref().sync_all().map_err(|e| io_error(path, e))?;
        Ok(())
    }

    /// Apply `change` to a copy of the collection, write it out, then swap it in.
    fn mutate(&self, change: impl FnOnce(&mut Vec<D>)) -> Result<()> {
        let mut docs = self
            .docs
            .lock()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;

        let mut next = docs.clone();
        change(&mut next);
        self.persist(&next)?;
        *docs = next;
        Ok(())
    }
}

impl<D: Document> DocumentStore<D> for JsonlStore<D> {
    fn find_all(&self) -> Result<Vec<D>> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        Ok(docs.clone())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<D>> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        Ok(docs.iter().find(|d| d.id() == Some(id)).cloned())
    }

    fn save(&self, mut doc: D) -> Result<D> {
        ensure_id(&mut doc);
        let saved = doc.clone();
        self.mutate(|docs| upsert(docs, doc))?;

        debug!(collection = D::COLLECTION, id = ?saved.id(), "Saved document");
        Ok(saved)
    }

    fn delete_by_id(&self, id: &str) -> Result<()> {
        {
            let docs = self
                .docs
                .lock()
                .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
            if !docs.iter().any(|d| d.id() == Some(id)) {
                return Ok(());
            }
        }
        self.mutate(|docs| docs.retain(|d| d.id() != Some(id)))?;

        debug!(collection = D::COLLECTION, id, "Deleted document");
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let docs = self
            .docs
            .lock()
            .map_err(|_| StorageError::Poisoned(D::COLLECTION))?;
        Ok(docs.len())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}
