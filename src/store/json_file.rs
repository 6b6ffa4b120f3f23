//! A [DocumentStore] backed by a single JSON file.

use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::Error;

use super::{Document, DocumentStore};

/// Stores the document as pretty-printed JSON at `path`.
///
/// A missing or empty file is read as an empty [Document]. Saves write to a
/// sibling temporary file and rename it over `path`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the file at `path`. The file is not touched until
    /// the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let mut file_name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store.json"));
        file_name.push(".tmp");

        self.path.with_file_name(file_name)
    }

    fn io_error(&self, action: &str, error: io::Error) -> Error {
        Error::StoreIo(format!(
            "could not {action} {}: {error}",
            self.path.display()
        ))
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Document, Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    "No store file at {:?}, starting from an empty document.",
                    self.path
                );
                return Ok(Document::default());
            }
            Err(error) => return Err(self.io_error("read", error)),
        };

        if text.trim().is_empty() {
            return Ok(Document::default());
        }

        serde_json::from_str(&text).map_err(|error| Error::StoreFormat(error.to_string()))
    }

    fn save(&self, document: &Document) -> Result<(), Error> {
        let mut text = serde_json::to_string_pretty(document)
            .map_err(|error| Error::StoreFormat(error.to_string()))?;
        text.push('\n');

        let temporary_path = self.temporary_path();
        let mut file = File::create(&temporary_path).map_err(|e| self.io_error("create", e))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| self.io_error("write", e))?;

        fs::rename(&temporary_path, &self.path).map_err(|e| self.io_error("replace", e))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use time::macros::datetime;

    use crate::{
        Account, Error,
        store::{Document, DocumentStore, Store},
        transaction::{Transaction, create_transaction},
    };

    use super::JsonFileStore;

    fn temp_store() -> (TempDir, JsonFileStore) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = JsonFileStore::new(temp_dir.path().join("data.json"));

        (temp_dir, store)
    }

    #[test]
    fn missing_file_loads_empty_document() {
        let (_temp_dir, store) = temp_store();

        assert_eq!(store.load(), Ok(Document::default()));
    }

    #[test]
    fn empty_file_loads_empty_document() {
        let (_temp_dir, store) = temp_store();
        fs::write(store.path(), "  \n").unwrap();

        assert_eq!(store.load(), Ok(Document::default()));
    }

    #[test]
    fn save_then_load_returns_same_document() {
        let (_temp_dir, store) = temp_store();
        let document = Document {
            account: Account {
                balance: 78160.0,
                owner: "Demo Owner".to_owned(),
                bank: "MyBank".to_owned(),
                country: "Ukraine".to_owned(),
            },
            ..Default::default()
        };

        store.save(&document).unwrap();

        assert_eq!(store.load(), Ok(document));
    }

    #[test]
    fn save_leaves_no_temporary_file() {
        let (temp_dir, store) = temp_store();

        store.save(&Document::default()).unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["data.json"]);
    }

    #[test]
    fn invalid_json_is_a_format_error() {
        let (_temp_dir, store) = temp_store();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(Error::StoreFormat(_))));
    }

    #[test]
    fn failed_mutation_does_not_touch_the_file() {
        let (_temp_dir, file_store) = temp_store();
        let path = file_store.path().to_owned();
        let store = Store::new(file_store);
        store
            .with_store(|document| {
                document.account.balance = 100.0;
                Ok(())
            })
            .unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let result: Result<(), Error> = store.with_store(|document| {
            document.account.balance = -1.0;
            Err(Error::DeleteMissingTransaction)
        });

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn overflowing_balance_is_never_written() {
        let (_temp_dir, file_store) = temp_store();
        let store = Store::new(file_store);
        let now = datetime!(2025-06-01 12:00 UTC);
        let create_big = |document: &mut Document| {
            create_transaction(Transaction::build("Big", 1.0e308, "X"), now, document)
        };

        store.with_store(create_big).unwrap();
        let result = store.with_store(create_big);

        assert!(matches!(result, Err(Error::Validation(_))));
        let (balance, count) = store
            .read(|document| (document.account.balance, document.expenses.len()))
            .expect("store file should still load");
        assert_eq!(balance, 1.0e308);
        assert_eq!(count, 1);
    }
}
