//! Durable storage for the preset document.
//!
//! The document is stored whole under a single fixed location; there are
//! no partial updates. The trait is the service's injectable storage
//! dependency, so tests can substitute an in-memory store.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use calsel_core::{CalselError, CalselResult};

/// A single-document store holding the full preset document.
pub trait GroupStore: Send {
    /// Read the stored document. `None` when nothing has been stored yet.
    fn load(&self) -> CalselResult<Option<Value>>;

    /// Replace the stored document wholesale.
    fn save(&self, document: &Value) -> CalselResult<()>;
}

const DOCUMENT_FILE: &str = "groups.json";

/// File-backed store: the whole document as JSON in a single file under
/// the data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }
}

impl GroupStore for FileStore {
    fn load(&self) -> CalselResult<Option<Value>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| CalselError::Storage(format!("Could not read {}: {e}", path.display())))?;
        let document = serde_json::from_str(&content)
            .map_err(|e| CalselError::Storage(format!("Could not parse {}: {e}", path.display())))?;

        Ok(Some(document))
    }

    fn save(&self, document: &Value) -> CalselResult<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| CalselError::Storage(format!("Could not create data directory: {e}")))?;

        let path = self.path();
        let temp = self.dir.join(DOCUMENT_FILE.to_string() + ".tmp");
        let content = serde_json::to_string_pretty(document)
            .map_err(|e| CalselError::Serialization(e.to_string()))?;

        // Write through a temp file so a failed write never clobbers the
        // previous document.
        std::fs::write(&temp, content)
            .map_err(|e| CalselError::Storage(format!("Could not write {}: {e}", temp.display())))?;
        std::fs::rename(&temp, &path)
            .map_err(|e| CalselError::Storage(format!("Could not replace {}: {e}", path.display())))?;

        Ok(())
    }
}

/// In-memory store for tests. Clones share the same document, so a test
/// can keep a handle while the service owns another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<Option<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_document(document: Value) -> Self {
        MemoryStore {
            document: Arc::new(Mutex::new(Some(document))),
        }
    }
}

impl GroupStore for MemoryStore {
    fn load(&self) -> CalselResult<Option<Value>> {
        self.document
            .lock()
            .map(|document| document.clone())
            .map_err(|_| CalselError::Storage("Failed to lock stored document".into()))
    }

    fn save(&self, document: &Value) -> CalselResult<()> {
        let mut guard = self
            .document
            .lock()
            .map_err(|_| CalselError::Storage("Failed to lock stored document".into()))?;
        *guard = Some(document.clone());
        Ok(())
    }
}
