//! Persistence for saved tracking sessions.
//!
//! The whole history lives in one slot as a JSON array. Every write reads the
//! collection, changes it in memory and overwrites the slot in one call.
//!
//! Writes work on the stored entries as raw JSON: only `id` and `createdAt`
//! are looked at, and every entry that is kept goes back out byte-for-byte as
//! it was read. Typed [`TrackingSession`] values are produced only for readers.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::db::KeyValueStore;
use crate::models::TrackingSession;

/// Slot holding the JSON-encoded session history.
pub const STORAGE_KEY: &str = "@fetal_tracker_sessions";

/// One stored array element, untouched, with the fields writes need.
struct StoredEntry {
    raw: Box<RawValue>,
    id: Option<String>,
    created_at: f64,
}

#[derive(Deserialize)]
struct EntryKeys {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "createdAt")]
    created_at: Option<Value>,
}

impl StoredEntry {
    fn new(raw: Box<RawValue>) -> Self {
        let keys = serde_json::from_str::<EntryKeys>(raw.get()).ok();
        let id = keys.as_ref().and_then(|k| match &k.id {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });
        // entries without a usable sort key sink to the end
        let created_at = keys
            .and_then(|k| k.created_at)
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::NEG_INFINITY);
        Self { raw, id, created_at }
    }
}

pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Append `session` and rewrite the history, most recent first.
    ///
    /// A history that cannot be read is treated as empty, so saving over a
    /// corrupt slot replaces it with just the new session.
    pub fn save_session(&self, session: &TrackingSession) -> Result<()> {
        let mut entries = self.read_entries_lenient();
        let raw = serde_json::value::to_raw_value(session).context("Failed to encode session")?;
        entries.push(StoredEntry::new(raw));
        self.write(entries).inspect_err(|e| {
            tracing::error!("Error saving session {}: {:#}", session.id, e);
        })?;
        tracing::info!(
            "Saved session {} ({} kicks in {} min)",
            session.id,
            session.kick_count,
            session.time_in_minutes
        );
        Ok(())
    }

    /// Every stored session, in stored order (most recent first).
    ///
    /// Read and parse failures are logged and reported as an empty history.
    /// There is no versioning of the stored format, so unreadable data has no
    /// recovery path beyond being overwritten by the next save. A single
    /// entry that does not decode is skipped; it stays in storage.
    pub fn get_all_sessions(&self) -> Vec<TrackingSession> {
        self.read_entries_lenient()
            .into_iter()
            .filter_map(|entry| match serde_json::from_str(entry.raw.get()) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!("Skipping unreadable session {:?}: {}", entry.id, e);
                    None
                }
            })
            .collect()
    }

    /// At most `limit` sessions from the front of the history.
    pub fn recent_sessions(&self, limit: usize) -> Vec<TrackingSession> {
        let mut sessions = self.get_all_sessions();
        sessions.truncate(limit);
        sessions
    }

    /// Remove the session with `id`. Returns `false` without writing when no
    /// session matches.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let entries = self.read_entries_lenient();
        let before = entries.len();
        let remaining: Vec<_> = entries
            .into_iter()
            .filter(|entry| entry.id.as_deref() != Some(id))
            .collect();

        if remaining.len() == before {
            tracing::debug!("No session with id {} to delete", id);
            return Ok(false);
        }

        self.write(remaining).inspect_err(|e| {
            tracing::error!("Error deleting session {}: {:#}", id, e);
        })?;
        tracing::info!("Deleted session {}", id);
        Ok(true)
    }

    /// Drop the entire history.
    pub fn clear_all(&self) -> Result<()> {
        self.backend
            .remove(STORAGE_KEY)
            .context("Failed to clear sessions")
            .inspect_err(|e| tracing::error!("Error clearing sessions: {:#}", e))?;
        tracing::info!("Cleared all sessions");
        Ok(())
    }

    fn read_entries_lenient(&self) -> Vec<StoredEntry> {
        match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Error getting sessions, treating history as empty: {:#}", e);
                Vec::new()
            }
        }
    }

    fn read_entries(&self) -> Result<Vec<StoredEntry>> {
        let Some(data) = self.backend.get(STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let raws: Vec<Box<RawValue>> =
            serde_json::from_str(&data).context("Stored sessions are not a JSON array")?;
        Ok(raws.into_iter().map(StoredEntry::new).collect())
    }

    fn write(&self, mut entries: Vec<StoredEntry>) -> Result<()> {
        // stable, so equal keys keep their stored order
        entries.sort_by(|a, b| b.created_at.total_cmp(&a.created_at));
        let raws: Vec<&RawValue> = entries.iter().map(|entry| &*entry.raw).collect();
        let data = serde_json::to_string(&raws).context("Failed to encode sessions")?;
        self.backend
            .set(STORAGE_KEY, &data)
            .context("Failed to write sessions")
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use chrono::{TimeZone, Utc};

    fn store() -> SessionStore<Database> {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        SessionStore::new(db)
    }

    fn session(id: &str, created_at: i64) -> TrackingSession {
        TrackingSession {
            id: id.to_string(),
            date: Utc.timestamp_millis_opt(created_at).unwrap(),
            time_in_minutes: 1,
            kick_count: 10,
            created_at,
        }
    }

    #[test]
    fn test_empty_slot_reads_empty() {
        assert!(store().get_all_sessions().is_empty());
    }

    #[test]
    fn test_empty_string_reads_empty() {
        let store = store();
        store.backend().set(STORAGE_KEY, "").unwrap();
        assert!(store.get_all_sessions().is_empty());
    }

    #[test]
    fn test_recent_sessions_truncates() {
        let store = store();
        for (i, created_at) in [1000, 2000, 3000].into_iter().enumerate() {
            store.save_session(&session(&i.to_string(), created_at)).unwrap();
        }

        let recent = store.recent_sessions(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].created_at, 3000);
        assert_eq!(recent[1].created_at, 2000);
    }

    #[test]
    fn test_equal_created_at_keeps_insertion_order() {
        let store = store();
        store.save_session(&session("first", 1000)).unwrap();
        store.save_session(&session("second", 1000)).unwrap();

        let ids: Vec<_> = store.get_all_sessions().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
