//! User record.

use serde::{Deserialize, Serialize};

/// A platform user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub email: String,

    /// Preferred locale for rendered notifications.
    pub locale: String,

    /// Opt-in: receive an email when mentioned in poll content.
    pub email_when_mentioned: bool,
}
