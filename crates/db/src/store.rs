//! In-memory record store.
//!
//! The engine consumes storage through the repository layer only; this store
//! backs those repositories with keyed tables behind a single `RwLock`.
//! Multi-record transitions (the latest-flag flip, cascade deletes) take one
//! write guard, which is what makes them atomic with respect to readers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::records::{
    Community, Discussion, DiscussionReader, Group, GroupMembership, Poll, PollCommunity,
    PollEvent, PollOption, Stance, StanceChoice, User,
};

/// Keyed tables, one per record type.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub polls: HashMap<String, Poll>,
    pub poll_options: HashMap<String, PollOption>,
    pub stances: HashMap<String, Stance>,
    pub stance_choices: HashMap<String, StanceChoice>,
    pub communities: HashMap<String, Community>,
    pub poll_communities: HashMap<String, PollCommunity>,
    pub groups: HashMap<String, Group>,
    pub group_memberships: HashMap<String, GroupMembership>,
    pub discussions: HashMap<String, Discussion>,
    pub discussion_readers: HashMap<String, DiscussionReader>,
    pub users: HashMap<String, User>,
    pub poll_events: HashMap<String, PollEvent>,
}

/// Cloneable handle to the record store.
///
/// All repositories constructed from the same handle observe the same data.
#[derive(Clone, Debug, Default)]
pub struct Store {
    tables: Arc<RwLock<Tables>>,
}

impl Store {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a read guard over the tables.
    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    /// Acquire a write guard over the tables.
    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}
