use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One saved kick-counting session.
///
/// The serialized form uses the camelCase keys of the stored blob
/// (`id`, `date`, `timeInMinutes`, `kickCount`, `createdAt`) so the history
/// survives unchanged across releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSession {
    pub id: String,
    /// When the session was recorded.
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    /// Minutes it took to reach the kick target, never below 1.
    pub time_in_minutes: u32,
    /// Kicks counted when the session was saved. Partial sessions are allowed.
    pub kick_count: u32,
    /// Epoch milliseconds, used only for ordering (most recent first).
    #[serde(deserialize_with = "epoch_millis")]
    pub created_at: i64,
}

impl TrackingSession {
    /// Build a record for a session saved at `now` after `elapsed_secs` of tracking.
    pub fn record(kick_count: u32, elapsed_secs: u64, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::next(now).into_string(),
            date: now,
            time_in_minutes: minutes_for(elapsed_secs),
            kick_count,
            created_at: now.timestamp_millis(),
        }
    }
}

/// Whole minutes for an elapsed duration, rounded up with a floor of one.
pub fn minutes_for(elapsed_secs: u64) -> u32 {
    let minutes = elapsed_secs.div_ceil(60).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

static LAST_ISSUED: AtomicI64 = AtomicI64::new(i64::MIN);

/// Epoch-millisecond identifier for a recorded session.
///
/// Ids are strictly increasing within the process: a second id requested in
/// the same millisecond (or after the clock stepped back) gets `last + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionId(i64);

impl SessionId {
    pub fn next(now: DateTime<Utc>) -> Self {
        let wanted = now.timestamp_millis();
        let previous = LAST_ISSUED
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(wanted.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        Self(wanted.max(previous.saturating_add(1)))
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn into_string(self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts any JSON number; fractional milliseconds are truncated.
fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_i64()
        .or_else(|| number.as_f64().map(|millis| millis.trunc() as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid createdAt {}", number)))
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
