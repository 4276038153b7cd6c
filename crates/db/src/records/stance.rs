//! Stance record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A participant's vote snapshot for a poll.
///
/// Only one stance per participant per poll carries `latest = true`; prior
/// stances are kept as history and excluded from aggregation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stance {
    pub id: String,
    pub poll_id: String,
    pub participant_id: String,

    /// The currently-counted stance for this participant.
    pub latest: bool,

    /// Free-text reason accompanying the vote.
    pub reason: Option<String>,

    pub cast_at: DateTime<Utc>,
}
