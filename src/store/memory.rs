//! A [DocumentStore] that never touches the disk.

use std::sync::Mutex;

use crate::Error;

use super::{Document, DocumentStore};

/// Keeps the document in memory. Used by tests and for throwaway servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<Document>,
}

impl MemoryStore {
    /// Create a store holding `document`.
    pub fn new(document: Document) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self) -> Result<Document, Error> {
        self.document
            .lock()
            .map(|document| document.clone())
            .map_err(|_| Error::StoreLock)
    }

    fn save(&self, document: &Document) -> Result<(), Error> {
        let mut stored = self.document.lock().map_err(|_| Error::StoreLock)?;
        *stored = document.clone();

        Ok(())
    }
}
