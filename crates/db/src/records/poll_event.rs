//! Poll event record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle events a poll publishes notifications for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollEventKind {
    PollCreated,
    PollOptionAdded,
    PollClosingSoon,
    PollClosed,
}

impl PollEventKind {
    /// Stable wire name of the event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PollCreated => "poll_created",
            Self::PollOptionAdded => "poll_option_added",
            Self::PollClosingSoon => "poll_closing_soon",
            Self::PollClosed => "poll_closed",
        }
    }
}

impl std::fmt::Display for PollEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A published notification event for a poll.
///
/// Used as the ledger that keeps closing-soon notices from being published
/// twice within the recency window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollEvent {
    pub id: String,
    pub poll_id: String,
    pub kind: PollEventKind,
    pub created_at: DateTime<Utc>,
}
