//! A small key/value store for short-lived values, kept in the store document.
//!
//! The endpoints need no token, so the number of entries and the size of each
//! entry are capped to keep anonymous writes from growing the document without
//! bound.

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration, OffsetDateTime};

use crate::{AppState, Error, store::Document, store::Store};

/// The most entries kept at once.
pub const MAX_TEMP_ENTRIES: usize = 1000;

/// The longest accepted key, in bytes.
pub const MAX_TEMP_KEY_LENGTH: usize = 256;

/// The largest accepted value, in bytes of compact JSON.
pub const MAX_TEMP_VALUE_BYTES: usize = 16 * 1024;

/// A value saved under a key, with the time it was saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempEntry {
    /// The saved JSON value.
    pub value: Value,
    /// When the value was saved.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// The request body for saving a temporary value.
#[derive(Debug, Deserialize)]
pub struct NewTempEntry {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    value: Value,
}

/// The response body after saving a temporary value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempEntrySaved {
    /// A human readable confirmation.
    pub message: String,
    /// The key the value was saved under.
    pub key: String,
}

/// Remove entries saved before `now - max_age` and return how many were removed.
pub fn prune_temp_entries(max_age: Duration, now: OffsetDateTime, document: &mut Document) -> usize {
    let Some(cutoff) = now.checked_sub(max_age) else {
        return 0;
    };
    let count_before = document.temp.len();
    document.temp.retain(|_, entry| entry.timestamp >= cutoff);

    count_before - document.temp.len()
}

/// Save `entry` under `key`, first dropping entries older than `max_age`.
///
/// # Errors
///
/// Returns [Error::Validation] if the key or value is too large, or if `key` is
/// new and the store already holds [MAX_TEMP_ENTRIES] live entries.
pub fn insert_temp_entry(
    key: String,
    entry: TempEntry,
    max_age: Duration,
    document: &mut Document,
) -> Result<(), Error> {
    if key.len() > MAX_TEMP_KEY_LENGTH {
        return Err(Error::Validation(format!(
            "key must be at most {MAX_TEMP_KEY_LENGTH} bytes"
        )));
    }
    let value_size = serde_json::to_string(&entry.value)
        .map_err(|error| Error::Validation(error.to_string()))?
        .len();
    if value_size > MAX_TEMP_VALUE_BYTES {
        return Err(Error::Validation(format!(
            "value must be at most {MAX_TEMP_VALUE_BYTES} bytes"
        )));
    }

    prune_temp_entries(max_age, entry.timestamp, document);
    if !document.temp.contains_key(&key) && document.temp.len() >= MAX_TEMP_ENTRIES {
        return Err(Error::Validation("temporary store is full".to_owned()));
    }
    document.temp.insert(key, entry);

    Ok(())
}

/// The state needed to save temporary values.
#[derive(Debug, Clone)]
pub struct TempState {
    /// The document store.
    pub store: Store,
    /// Entries older than this are dropped before a new one is saved.
    pub max_age: Duration,
}

impl FromRef<AppState> for TempState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            max_age: state.retention.max_temp_entry_age,
        }
    }
}

/// A route handler for saving a value under a key, replacing any previous value.
pub async fn post_temp(
    State(state): State<TempState>,
    body: Result<Json<NewTempEntry>, JsonRejection>,
) -> Result<Json<TempEntrySaved>, Error> {
    let Json(NewTempEntry { key, value }) = body?;
    let key = key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::Validation("key is required".to_owned()))?;

    let entry = TempEntry {
        value,
        timestamp: OffsetDateTime::now_utc(),
    };
    state
        .store
        .with_store(|document| insert_temp_entry(key.clone(), entry, state.max_age, document))?;

    Ok(Json(TempEntrySaved {
        message: "Data stored".to_owned(),
        key,
    }))
}

/// A route handler for reading the value saved under `key`.
pub async fn get_temp(
    State(store): State<Store>,
    Path(key): Path<String>,
) -> Result<Json<TempEntry>, Error> {
    store
        .read(|document| document.temp.get(&key).cloned())?
        .map(Json)
        .ok_or(Error::NotFound)
}
