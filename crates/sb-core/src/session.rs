//! Per-member session state and duration computation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::classify::Transition;
use crate::types::MemberId;

/// The session store's answer to an applied transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// A session started for the member.
    Entered { member: MemberId },
    /// A session ended for the member.
    ///
    /// `duration_ms` is `None` when no start was on record (typically the
    /// process restarted while the member was already present). Callers must
    /// report that case distinctly instead of inventing a zero duration.
    Left {
        member: MemberId,
        duration_ms: Option<i64>,
    },
}

/// Tracks at most one active session per member.
///
/// Plain owned value, injected into whatever drives it; there is no global.
/// State is volatile: a restart forgets all active sessions, and the next
/// Leave for an affected member degrades to the `None`-duration case.
///
/// The store itself is not synchronized. The dispatcher owns it from a single
/// event-loop task, which serializes all mutations; anything fancier must
/// serialize access per member.
#[derive(Debug, Default)]
pub struct SessionStore {
    started_at: HashMap<MemberId, DateTime<Utc>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a session start, overwriting any existing record.
    ///
    /// Overwriting is the point: a stale record from a missed Leave would
    /// otherwise inflate the member's next duration.
    pub fn on_enter(&mut self, member: MemberId, now: DateTime<Utc>) {
        if let Some(stale) = self.started_at.insert(member.clone(), now) {
            tracing::debug!(%member, %stale, "replaced stale session start");
        }
    }

    /// Ends the member's session and returns its duration in milliseconds.
    ///
    /// Returns `None` when no start was on record. Lookup and delete are one
    /// map operation, so a Leave can never be double-counted. A clock anomaly
    /// (`now` before the recorded start) clamps to zero rather than producing
    /// a negative duration.
    pub fn on_leave(&mut self, member: &MemberId, now: DateTime<Utc>) -> Option<i64> {
        let started_at = self.started_at.remove(member)?;
        Some((now - started_at).num_milliseconds().max(0))
    }

    /// Drives the store from a classified transition.
    ///
    /// `Ignore` yields `None` and leaves all records untouched.
    pub fn apply(&mut self, transition: Transition, now: DateTime<Utc>) -> Option<SessionChange> {
        match transition {
            Transition::Enter { member } => {
                self.on_enter(member.clone(), now);
                Some(SessionChange::Entered { member })
            }
            Transition::Leave { member } => {
                let duration_ms = self.on_leave(&member, now);
                Some(SessionChange::Left {
                    member,
                    duration_ms,
                })
            }
            Transition::Ignore => None,
        }
    }

    /// Number of members currently in a session.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.started_at.len()
    }
}
