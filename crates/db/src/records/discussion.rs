//! Discussion records.

use serde::{Deserialize, Serialize};

/// A discussion thread a poll can live in. A discussion always belongs to a
/// group; polls attached to the discussion inherit that group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub group_id: String,
    pub title: String,
}

/// How loudly a reader wants to hear about a discussion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volume {
    /// No notifications at all.
    Mute,
    /// In-app only, no email.
    Quiet,
    /// Regular email notifications.
    #[default]
    Normal,
    /// Email for everything.
    Loud,
}

impl Volume {
    /// Whether announcement emails reach this reader.
    #[must_use]
    pub const fn receives_email(self) -> bool {
        matches!(self, Self::Normal | Self::Loud)
    }
}

/// A user's relationship to a discussion, with their volume preference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionReader {
    pub id: String,
    pub discussion_id: String,
    pub user_id: String,
    pub volume: Volume,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_normal_and_loud_receive_email() {
        assert!(!Volume::Mute.receives_email());
        assert!(!Volume::Quiet.receives_email());
        assert!(Volume::Normal.receives_email());
        assert!(Volume::Loud.receives_email());
    }
}
