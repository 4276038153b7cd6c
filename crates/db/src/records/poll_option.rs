//! Poll option record.

use serde::{Deserialize, Serialize};

/// One option of a poll.
///
/// `name` is unique within the poll; `priority` defines display and
/// aggregation order, ascending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: String,
    pub poll_id: String,
    pub name: String,
    pub priority: i32,
}
