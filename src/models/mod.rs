//! Domain models for the kick counter.
//!
//! # Core Concepts
//!
//! - [`TrackingSession`]: One saved kick-counting attempt. Records are created
//!   only when the user explicitly saves, are never edited afterwards, and go
//!   away only through deletion or a full clear.
//! - [`SessionId`]: Time-based identifier issued when a session is recorded.

mod session;

pub use session::*;
