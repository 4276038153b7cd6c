//! Poll record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A group decision poll.
///
/// `stance_data`, `stance_counts` and `matrix_counts` are derived aggregates
/// maintained by the aggregation service; they are eventually-consistent
/// snapshots, not sources of truth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,

    /// Key into the poll template registry.
    pub poll_type: String,

    pub title: String,
    pub details: Option<String>,

    pub author_id: String,

    /// Owning group. Setting a discussion implies inheriting its group.
    pub group_id: Option<String>,
    pub discussion_id: Option<String>,

    /// When the poll is scheduled to close. Must be in the future while the
    /// poll is active.
    pub closing_at: Option<DateTime<Utc>>,

    /// Set when the poll closes. The poll is active iff this is `None`.
    pub closed_at: Option<DateTime<Utc>>,

    /// Opt-out from the template's single-choice rule.
    pub multiple_choice: bool,

    /// Template-declared extra fields, e.g. `dots_per_person`, `time_zone`.
    pub custom_fields: Map<String, Value>,

    /// Option name -> summed score of latest stances. Options with no votes
    /// appear with 0.
    pub stance_data: BTreeMap<String, i64>,

    /// Totals from `stance_data` aligned to option priority order.
    pub stance_counts: Vec<i64>,

    /// Option-by-stance grid for matrix chart polls, capped at 5x5.
    pub matrix_counts: Option<Vec<Vec<bool>>>,

    /// Counter cache: number of latest stances.
    pub stances_count: u64,

    /// Counter cache: eligible members who have not voted.
    pub undecided_count: u64,

    pub created_at: DateTime<Utc>,
}

impl Poll {
    /// A poll is active until it is closed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.closed_at.is_none()
    }

    /// A custom field value, if present.
    #[must_use]
    pub fn custom_field(&self, name: &str) -> Option<&Value> {
        self.custom_fields.get(name)
    }

    /// Whether a custom field is missing, null, or a blank string.
    #[must_use]
    pub fn custom_field_blank(&self, name: &str) -> bool {
        match self.custom_fields.get(name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_poll() -> Poll {
        Poll {
            id: "p1".to_string(),
            poll_type: "poll".to_string(),
            title: "Lunch spot".to_string(),
            details: None,
            author_id: "u1".to_string(),
            group_id: None,
            discussion_id: None,
            closing_at: None,
            closed_at: None,
            multiple_choice: false,
            custom_fields: Map::new(),
            stance_data: BTreeMap::new(),
            stance_counts: Vec::new(),
            matrix_counts: None,
            stances_count: 0,
            undecided_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn active_until_closed() {
        let mut poll = minimal_poll();
        assert!(poll.is_active());

        poll.closed_at = Some(Utc::now());
        assert!(!poll.is_active());
    }

    #[test]
    fn blank_custom_fields() {
        let mut poll = minimal_poll();
        assert!(poll.custom_field_blank("time_zone"));

        poll.custom_fields
            .insert("time_zone".to_string(), Value::String("  ".to_string()));
        assert!(poll.custom_field_blank("time_zone"));

        poll.custom_fields.insert(
            "time_zone".to_string(),
            Value::String("Pacific/Auckland".to_string()),
        );
        assert!(!poll.custom_field_blank("time_zone"));

        poll.custom_fields
            .insert("dots_per_person".to_string(), Value::from(8));
        assert!(!poll.custom_field_blank("dots_per_person"));
    }
}
