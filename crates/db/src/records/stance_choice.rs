//! Stance choice record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One option selection within a stance, carrying a score weight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StanceChoice {
    pub id: String,
    pub stance_id: String,
    pub poll_option_id: String,

    /// Integer weight this choice contributes to its option's total.
    pub score: i64,

    /// Whether the owning stance carries a reason. Reasons sort first in the
    /// grouped display view.
    pub has_reason: bool,

    pub created_at: DateTime<Utc>,
}
