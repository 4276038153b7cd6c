//! Community records.

use serde::{Deserialize, Serialize};

/// The kind of audience a community describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunityKind {
    /// Members of a group; membership is resolved through the group.
    Group,
    /// An explicit list of users.
    Explicit,
    /// Anyone may participate; carries no member list.
    Public,
}

/// An audience a poll can be associated with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub kind: CommunityKind,

    /// Backing group, for [`CommunityKind::Group`] communities.
    pub group_id: Option<String>,

    /// Explicit member list, for [`CommunityKind::Explicit`] communities.
    pub user_ids: Vec<String>,
}

/// Join record between a poll and a community.
///
/// A poll holds at most one community of a given kind; attaching a second
/// one replaces the first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollCommunity {
    pub id: String,
    pub poll_id: String,
    pub community_id: String,
}
