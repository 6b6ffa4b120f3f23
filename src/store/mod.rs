//! Persistence for the application [Document].
//!
//! Handlers never read or write storage directly. They go through [Store],
//! which holds a lock for the whole load-mutate-save cycle and persists the
//! document in a single write, so the transaction list and the account
//! balance are always saved together.

mod document;
mod json_file;
mod memory;

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, PoisonError},
};

pub use document::Document;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::Error;

/// Loads and saves the whole application [Document].
pub trait DocumentStore: Send + Sync {
    /// Read the current document.
    fn load(&self) -> Result<Document, Error>;

    /// Replace the stored document with `document`.
    ///
    /// Implementers must make the replacement atomic: a reader sees either the
    /// old document or the new one, never a mix of the two.
    fn save(&self, document: &Document) -> Result<(), Error>;
}

/// Shared handle to the application's [DocumentStore].
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentStore>,
    lock: Arc<Mutex<()>>,
}

impl Store {
    /// Wrap a [DocumentStore] backend.
    pub fn new(backend: impl DocumentStore + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a store that keeps `document` in memory only.
    pub fn in_memory(document: Document) -> Self {
        Self::new(MemoryStore::new(document))
    }

    /// Run `reader` against the current document.
    ///
    /// # Errors
    /// Returns an error if the document cannot be loaded.
    pub fn read<T>(&self, reader: impl FnOnce(&Document) -> T) -> Result<T, Error> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let document = self.backend.load()?;

        Ok(reader(&document))
    }

    /// Load the document, apply `mutator` and persist the result.
    ///
    /// The document is saved only if `mutator` returns `Ok`. If it returns an
    /// error, nothing is written and the error is passed back to the caller.
    /// Concurrent calls are serialised, so no update is lost. A mutator that
    /// panics leaves the stored document untouched and does not block later calls.
    ///
    /// # Errors
    /// Returns the mutator's error, or an error if the document cannot be
    /// loaded or saved.
    pub fn with_store<T>(
        &self,
        mutator: impl FnOnce(&mut Document) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.backend.load()?;

        let output = mutator(&mut document)?;
        self.backend.save(&document)?;

        Ok(output)
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}
