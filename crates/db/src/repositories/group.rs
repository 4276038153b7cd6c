//! Group repository.

use agora_common::{AppError, AppResult};

use crate::records::{Group, GroupMembership};
use crate::store::Store;

/// Group repository for store operations.
#[derive(Clone)]
pub struct GroupRepository {
    store: Store,
}

impl GroupRepository {
    /// Create a new group repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a group.
    pub async fn create(&self, group: Group) -> AppResult<Group> {
        let mut tables = self.store.write().await;
        if tables.groups.contains_key(&group.id) {
            return Err(AppError::Store(format!("duplicate group id: {}", group.id)));
        }
        tables.groups.insert(group.id.clone(), group.clone());
        Ok(group)
    }

    /// Find a group by ID.
    pub async fn find_by_id(&self, group_id: &str) -> AppResult<Option<Group>> {
        Ok(self.store.read().await.groups.get(group_id).cloned())
    }

    /// Get a group by ID, returning an error if not found.
    pub async fn get_by_id(&self, group_id: &str) -> AppResult<Group> {
        self.find_by_id(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group not found: {group_id}")))
    }

    /// Add a member to a group. Adding an existing member is a no-op.
    pub async fn add_member(&self, membership: GroupMembership) -> AppResult<()> {
        let mut tables = self.store.write().await;
        let already = tables
            .group_memberships
            .values()
            .any(|m| m.group_id == membership.group_id && m.user_id == membership.user_id);
        if !already {
            tables
                .group_memberships
                .insert(membership.id.clone(), membership);
        }
        Ok(())
    }

    /// Member user ids of a group, sorted.
    pub async fn member_ids(&self, group_id: &str) -> AppResult<Vec<String>> {
        let tables = self.store.read().await;
        let mut ids: Vec<String> = tables
            .group_memberships
            .values()
            .filter(|m| m.group_id == group_id)
            .map(|m| m.user_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Whether a user is a member of a group.
    pub async fn is_member(&self, group_id: &str, user_id: &str) -> AppResult<bool> {
        let tables = self.store.read().await;
        Ok(tables
            .group_memberships
            .values()
            .any(|m| m.group_id == group_id && m.user_id == user_id))
    }
}
