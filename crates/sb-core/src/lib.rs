//! Core presence-session tracking for StudyBell.
//!
//! This crate contains the fundamental types and logic for:
//! - Classification: mapping raw presence events to Enter/Leave/Ignore
//! - Session tracking: per-member start times and elapsed durations
//! - Formatting: rendering durations for notifications
//!
//! Everything here is pure and synchronous; delivering events and sending
//! notifications is the caller's concern.

mod classify;
mod event;
mod format;
mod session;
pub mod types;

pub use classify::{Transition, classify};
pub use event::PresenceUpdate;
pub use format::format_duration;
pub use session::{SessionChange, SessionStore};
pub use types::{ChannelId, MemberId, ValidationError};
