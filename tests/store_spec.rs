use chrono::{TimeZone, Utc};
use kick_counter::db::{Database, KeyValueStore};
use kick_counter::models::TrackingSession;
use kick_counter::store::{SessionStore, STORAGE_KEY};
use serde_json::value::RawValue;
use speculate2::speculate;

fn session(id: &str, created_at: i64) -> TrackingSession {
    TrackingSession {
        id: id.to_string(),
        date: Utc.timestamp_millis_opt(created_at).unwrap(),
        time_in_minutes: 2,
        kick_count: 10,
        created_at,
    }
}

fn ids(store: &SessionStore<Database>) -> Vec<String> {
    store.get_all_sessions().into_iter().map(|s| s.id).collect()
}

/// Reads like a database, refuses every write.
struct ReadOnly(Database);

impl KeyValueStore for ReadOnly {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk is read-only")
    }

    fn remove(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("disk is read-only")
    }
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
        let store = SessionStore::new(db);
    }

    describe "get_all_sessions" {
        it "returns an empty list when nothing was stored" {
            assert!(store.get_all_sessions().is_empty());
        }

        it "treats unparseable data as an empty history" {
            store.backend().set(STORAGE_KEY, "{not json").expect("Failed to seed");
            assert!(store.get_all_sessions().is_empty());
        }

        it "treats a non-array blob as an empty history" {
            store.backend().set(STORAGE_KEY, r#"{"id":"1"}"#).expect("Failed to seed");
            assert!(store.get_all_sessions().is_empty());
        }

        it "reads records with fractional createdAt" {
            let raw = r#"[{"id":"1","date":"2024-03-01T08:00:00.000Z","timeInMinutes":1,"kickCount":3,"createdAt":2000.5}]"#;
            store.backend().set(STORAGE_KEY, raw).expect("Failed to seed");

            let sessions = store.get_all_sessions();
            assert_eq!(sessions.len(), 1);
            assert_eq!(sessions[0].created_at, 2000);
        }

        it "skips one unreadable record without hiding the rest" {
            let raw = r#"[{"id":"2","kickCount":"many"},{"id":"1","date":"2024-03-01T08:00:00.000Z","timeInMinutes":1,"kickCount":3,"createdAt":1000}]"#;
            store.backend().set(STORAGE_KEY, raw).expect("Failed to seed");

            assert_eq!(ids(&store), vec!["1"]);
        }

        it "reads records written in the stored key format" {
            let raw = r#"[{"id":"1709280000000","date":"2024-03-01T08:00:00.000Z","timeInMinutes":4,"kickCount":10,"createdAt":1709280000000}]"#;
            store.backend().set(STORAGE_KEY, raw).expect("Failed to seed");

            let sessions = store.get_all_sessions();
            assert_eq!(sessions.len(), 1);
            assert_eq!(sessions[0].time_in_minutes, 4);
            assert_eq!(sessions[0].created_at, 1_709_280_000_000);
        }
    }

    describe "save_session" {
        it "stores the new session" {
            let a = session("a", 1000);
            store.save_session(&a).expect("Failed to save");
            assert_eq!(store.get_all_sessions(), vec![a]);
        }

        it "orders sessions most recent first" {
            store.save_session(&session("a", 1000)).expect("Failed to save");
            store.save_session(&session("b", 2000)).expect("Failed to save");
            assert_eq!(ids(&store), vec!["b", "a"]);
        }

        it "re-sorts when an older session is saved later" {
            store.save_session(&session("new", 3000)).expect("Failed to save");
            store.save_session(&session("old", 1000)).expect("Failed to save");
            store.save_session(&session("mid", 2000)).expect("Failed to save");
            assert_eq!(ids(&store), vec!["new", "mid", "old"]);
        }

        it "writes the whole history as one JSON array" {
            store.save_session(&session("a", 1000)).expect("Failed to save");
            store.save_session(&session("b", 2000)).expect("Failed to save");

            let raw = store.backend().get(STORAGE_KEY).expect("Read failed").expect("Slot missing");
            let value: serde_json::Value = serde_json::from_str(&raw).expect("Invalid JSON");
            let array = value.as_array().expect("Not an array");
            assert_eq!(array.len(), 2);
            assert_eq!(array[0]["createdAt"], 2000);
            assert_eq!(array[0]["kickCount"], 10);
            assert_eq!(array[0]["timeInMinutes"], 2);
        }

        it "keeps unreadable records when saving" {
            let odd = r#"{"id":"odd","kickCount":"many","createdAt":500}"#;
            store.backend().set(STORAGE_KEY, &format!("[{}]", odd)).expect("Failed to seed");

            store.save_session(&session("a", 1000)).expect("Failed to save");

            let raw = store.backend().get(STORAGE_KEY).expect("Read failed").expect("Slot missing");
            assert!(raw.ends_with(&format!(",{}]", odd)));
            assert_eq!(ids(&store), vec!["a"]);
        }

        it "replaces corrupt data with the new session" {
            store.backend().set(STORAGE_KEY, "garbage").expect("Failed to seed");
            store.save_session(&session("a", 1000)).expect("Failed to save");
            assert_eq!(ids(&store), vec!["a"]);
        }
    }

    describe "delete_session" {
        it "removes only the matching session and keeps the others byte-for-byte" {
            let kept_new = r#"{"id":"3","date":"2024-03-01T10:00:00+02:00","timeInMinutes":4,"kickCount":10,"createdAt":3000}"#;
            let doomed = r#"{"id":"2","date":"2024-03-01T07:00:00.000Z","timeInMinutes":2,"kickCount":10,"createdAt":2000}"#;
            let kept_old = r#"{"id":"1","date":"2024-03-01T06:00:00Z","timeInMinutes":1.0,"kickCount":10,"createdAt":1000.5,"note":"extra"}"#;
            let seeded = format!("[{},{},{}]", kept_new, doomed, kept_old);
            store.backend().set(STORAGE_KEY, &seeded).expect("Failed to seed");

            assert!(store.delete_session("2").expect("Failed to delete"));

            let raw = store.backend().get(STORAGE_KEY).expect("Read failed").expect("Slot missing");
            assert_eq!(raw, format!("[{},{}]", kept_new, kept_old));
        }

        it "keeps saved sessions byte-for-byte when a sibling is deleted" {
            store.save_session(&session("a", 1000)).expect("Failed to save");
            store.save_session(&session("b", 2000)).expect("Failed to save");
            store.save_session(&session("c", 3000)).expect("Failed to save");
            let blob = store.backend().get(STORAGE_KEY).expect("Read failed").expect("Slot missing");
            let before: Vec<Box<RawValue>> = serde_json::from_str(&blob).expect("Invalid JSON");

            assert!(store.delete_session("b").expect("Failed to delete"));

            let raw = store.backend().get(STORAGE_KEY).expect("Read failed").expect("Slot missing");
            assert_eq!(raw, format!("[{},{}]", before[0].get(), before[2].get()));
        }

        it "leaves the stored blob untouched for an unknown id" {
            store.save_session(&session("a", 1000)).expect("Failed to save");
            let before = store.backend().get(STORAGE_KEY).expect("Read failed");

            assert!(!store.delete_session("missing").expect("Failed to delete"));

            let after = store.backend().get(STORAGE_KEY).expect("Read failed");
            assert_eq!(before, after);
        }

        it "is a no-op on an empty history" {
            assert!(!store.delete_session("missing").expect("Failed to delete"));
            assert_eq!(store.backend().get(STORAGE_KEY).expect("Read failed"), None);
        }
    }

    describe "clear_all" {
        it "empties the history" {
            store.save_session(&session("a", 1000)).expect("Failed to save");
            store.save_session(&session("b", 2000)).expect("Failed to save");

            store.clear_all().expect("Failed to clear");

            assert!(store.get_all_sessions().is_empty());
            assert_eq!(store.backend().get(STORAGE_KEY).expect("Read failed"), None);
        }

        it "succeeds when nothing was stored" {
            store.clear_all().expect("Failed to clear");
            assert!(store.get_all_sessions().is_empty());
        }
    }

    describe "storage failures" {
        it "propagates write errors from save_session" {
            let db = Database::open_memory().expect("Failed to create database");
            db.migrate().expect("Failed to migrate");
            let failing = SessionStore::new(ReadOnly(db));

            let err = failing.save_session(&session("a", 1000)).unwrap_err();
            assert!(format!("{:#}", err).contains("read-only"));
            assert!(failing.get_all_sessions().is_empty());
        }

        it "propagates write errors from delete_session and clear_all" {
            let db = Database::open_memory().expect("Failed to create database");
            db.migrate().expect("Failed to migrate");
            SessionStore::new(db.clone()).save_session(&session("a", 1000)).expect("Failed to save");
            let failing = SessionStore::new(ReadOnly(db));

            assert!(failing.delete_session("a").is_err());
            assert!(failing.clear_all().is_err());
            assert_eq!(failing.get_all_sessions().len(), 1);
        }

        it "reads an unmigrated database as empty" {
            let db = Database::open_memory().expect("Failed to create database");
            let unmigrated = SessionStore::new(db);
            assert!(unmigrated.get_all_sessions().is_empty());
        }
    }

    describe "on disk" {
        it "keeps sessions across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("data").join("kicks.db");

            {
                let db = Database::open(path.clone()).expect("Failed to open");
                db.migrate().expect("Failed to migrate");
                SessionStore::new(db).save_session(&session("a", 1000)).expect("Failed to save");
            }

            let db = Database::open(path).expect("Failed to reopen");
            db.migrate().expect("Failed to migrate");
            let reopened = SessionStore::new(db);
            assert_eq!(ids(&reopened), vec!["a"]);
        }
    }
}
