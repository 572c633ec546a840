//! The kick-counting state machine.
//!
//! A [`TrackingTimer`] covers one counting attempt. The first kick starts the
//! clock, the tenth stops it, and the attempt ends either saved to a
//! [`SessionStore`] or discarded.
//!
//! ```text
//! Idle --kick--> Tracking --kick x9--> Complete
//!                   |                     |
//!                   +----> Saved / Discarded <----+
//! ```

mod ticker;

pub use ticker::*;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::KeyValueStore;
use crate::models::TrackingSession;
use crate::store::SessionStore;

/// Kicks that end active counting.
pub const KICK_TARGET: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No kicks yet, clock not started.
    Idle,
    /// Counting; the clock advances once per second.
    Tracking,
    /// Target reached; the clock is stopped.
    Complete,
    Saved,
    Discarded,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Tracking => "tracking",
            Self::Complete => "complete",
            Self::Saved => "saved",
            Self::Discarded => "discarded",
        }
    }

    /// True once the attempt has been saved or discarded.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Saved | Self::Discarded)
    }
}

/// What a kick event did to the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickOutcome {
    /// First kick: tracking started, count is 1.
    Started,
    /// Count increased to the contained value.
    Counted(u32),
    /// Count reached the target and the clock stopped.
    Completed,
    /// Kick arrived at or past the ceiling, or after the attempt ended.
    Ignored,
}

impl KickOutcome {
    /// Whether the kick changed the count (and so deserves haptic feedback).
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Result of asking to leave the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardRequest {
    /// Nothing was recorded; the attempt is already discarded.
    Discarded,
    /// Kicks would be lost; call [`TrackingTimer::confirm_discard`] to proceed.
    NeedsConfirmation,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("No Kicks Recorded: Please record at least one kick before saving.")]
    NothingRecorded,

    #[error("This session has already been {0}")]
    Finished(&'static str),

    #[error("Failed to save session. Please try again.")]
    Storage(#[source] anyhow::Error),
}

impl SaveError {
    /// Storage failures leave the count intact, so the same save can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

#[derive(Debug)]
pub struct TrackingTimer {
    phase: Phase,
    kicks: u32,
    elapsed_secs: u64,
    started_at: Option<DateTime<Utc>>,
    ticks: Option<TickSender>,
    ticker: Option<Ticker>,
}

impl Default for TrackingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingTimer {
    /// A timer whose clock is advanced only by explicit [`tick`](Self::tick) calls.
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            kicks: 0,
            elapsed_secs: 0,
            started_at: None,
            ticks: None,
            ticker: None,
        }
    }

    /// A timer that runs a [`Ticker`] feeding `ticks` while tracking.
    ///
    /// The owner drains the matching receiver and calls [`tick`](Self::tick)
    /// for each message. Kicking this timer requires a tokio runtime.
    pub fn with_ticker(ticks: TickSender) -> Self {
        Self {
            ticks: Some(ticks),
            ..Self::new()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn kick_count(&self) -> u32 {
        self.kicks
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_tracking(&self) -> bool {
        self.phase == Phase::Tracking
    }

    /// Kicks still needed to reach the target.
    pub fn remaining(&self) -> u32 {
        KICK_TARGET.saturating_sub(self.kicks)
    }

    /// Whether a ticker is currently held.
    pub fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn kick(&mut self, now: DateTime<Utc>) -> KickOutcome {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Tracking;
                self.started_at = Some(now);
                self.ticker = self.ticks.clone().map(Ticker::spawn);
                self.advance_count()
            }
            Phase::Tracking => self.advance_count(),
            Phase::Complete | Phase::Saved | Phase::Discarded => KickOutcome::Ignored,
        }
    }

    // The ceiling is checked against the count after the increment.
    fn advance_count(&mut self) -> KickOutcome {
        let next = self.kicks + 1;
        self.kicks = next;
        if next >= KICK_TARGET {
            self.phase = Phase::Complete;
            self.ticker = None;
            tracing::debug!("Kick target reached after {}s", self.elapsed_secs);
            KickOutcome::Completed
        } else if next == 1 {
            KickOutcome::Started
        } else {
            KickOutcome::Counted(next)
        }
    }

    /// Advance the clock by one second. Returns `false` when not tracking.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::Tracking {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    /// The record that saving at `now` would persist.
    pub fn finalize(&self, now: DateTime<Utc>) -> Result<TrackingSession, SaveError> {
        if self.phase.is_finished() {
            return Err(SaveError::Finished(self.phase.as_str()));
        }
        if self.kicks == 0 {
            return Err(SaveError::NothingRecorded);
        }
        Ok(TrackingSession::record(self.kicks, self.elapsed_secs, now))
    }

    /// Persist the current count. On a storage failure nothing changes here,
    /// so the save can be retried.
    pub fn save<S: KeyValueStore>(
        &mut self,
        store: &SessionStore<S>,
        now: DateTime<Utc>,
    ) -> Result<TrackingSession, SaveError> {
        let session = self.finalize(now)?;
        store.save_session(&session).map_err(SaveError::Storage)?;
        self.ticker = None;
        self.phase = Phase::Saved;
        Ok(session)
    }

    /// Ask to abandon the attempt. Only an untouched timer is discarded
    /// without confirmation.
    pub fn request_discard(&mut self) -> DiscardRequest {
        if self.kicks > 0 || self.phase == Phase::Tracking {
            return DiscardRequest::NeedsConfirmation;
        }
        self.confirm_discard();
        DiscardRequest::Discarded
    }

    pub fn confirm_discard(&mut self) {
        if self.phase == Phase::Saved {
            return;
        }
        self.ticker = None;
        self.phase = Phase::Discarded;
    }
}
