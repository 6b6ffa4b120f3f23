//! Removes inactive users and expired temporary entries.
//!
//! The sweep runs on a timer in the server and can also be triggered through the API.

use axum::{
    Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error, auth::remove_inactive_users, store::Store, temp_store::prune_temp_entries,
};

/// How long users and temporary entries are kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetentionPolicy {
    /// Users who have not logged in or registered within this duration are removed.
    pub max_user_inactivity: Duration,
    /// Temporary entries older than this are removed.
    pub max_temp_entry_age: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_user_inactivity: Duration::days(5),
            max_temp_entry_age: Duration::hours(1),
        }
    }
}

/// What a sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// The number of users removed for inactivity.
    pub removed_users: usize,
    /// The number of expired temporary entries removed.
    pub removed_temp_entries: usize,
}

/// Remove users and temporary entries that fall outside `policy` as of `now`.
///
/// Transactions are not owned by users, so they and the account balance are
/// left untouched.
///
/// # Errors
///
/// Returns an error if the store could not be loaded or saved.
pub fn sweep(
    store: &Store,
    policy: &RetentionPolicy,
    now: OffsetDateTime,
) -> Result<SweepReport, Error> {
    store.with_store(|document| {
        Ok(SweepReport {
            removed_users: remove_inactive_users(policy.max_user_inactivity, now, document),
            removed_temp_entries: prune_temp_entries(policy.max_temp_entry_age, now, document),
        })
    })
}

/// Run [sweep] every `period` until the task is dropped.
///
/// The first sweep happens one `period` after the call. Failed sweeps are
/// logged and retried on the next tick.
pub async fn run_periodic_sweep(store: Store, policy: RetentionPolicy, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        match sweep(&store, &policy, OffsetDateTime::now_utc()) {
            Ok(report) => tracing::info!(
                "Cleanup removed {} inactive users and {} temporary entries",
                report.removed_users,
                report.removed_temp_entries
            ),
            Err(error) => tracing::error!("Cleanup sweep failed: {error}"),
        }
    }
}

/// The state needed to run a sweep from a request.
#[derive(Debug, Clone)]
pub struct CleanupState {
    /// The document store.
    pub store: Store,
    /// The retention policy to sweep with.
    pub retention: RetentionPolicy,
}

impl FromRef<AppState> for CleanupState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            retention: state.retention,
        }
    }
}

/// A route handler that runs a sweep immediately and reports what was removed.
pub async fn post_cleanup(State(state): State<CleanupState>) -> Result<Json<SweepReport>, Error> {
    let report = sweep(&state.store, &state.retention, OffsetDateTime::now_utc())?;
    tracing::info!("Manual cleanup: {report:?}");

    Ok(Json(report))
}
