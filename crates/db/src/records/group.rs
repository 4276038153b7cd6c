//! Group records.

use serde::{Deserialize, Serialize};

/// A group of users that polls can broadcast to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

/// Group membership - tracks which users are in which groups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub id: String,
    pub group_id: String,
    pub user_id: String,
}
