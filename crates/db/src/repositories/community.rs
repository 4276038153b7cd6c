//! Community repository.

use agora_common::{AppError, AppResult};

use crate::records::{Community, CommunityKind, PollCommunity};
use crate::store::Store;

/// Community repository for store operations.
#[derive(Clone)]
pub struct CommunityRepository {
    store: Store,
}

impl CommunityRepository {
    /// Create a new community repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a community.
    pub async fn create(&self, community: Community) -> AppResult<Community> {
        let mut tables = self.store.write().await;
        if tables.communities.contains_key(&community.id) {
            return Err(AppError::Store(format!(
                "duplicate community id: {}",
                community.id
            )));
        }
        tables
            .communities
            .insert(community.id.clone(), community.clone());
        Ok(community)
    }

    /// Find a community by ID.
    pub async fn find_by_id(&self, community_id: &str) -> AppResult<Option<Community>> {
        Ok(self.store.read().await.communities.get(community_id).cloned())
    }

    /// Get a community by ID, returning an error if not found.
    pub async fn get_by_id(&self, community_id: &str) -> AppResult<Community> {
        self.find_by_id(community_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Community not found: {community_id}")))
    }

    /// Attach a community to a poll.
    ///
    /// A poll holds at most one community of a given kind; an existing join
    /// to a community of the same kind is removed first.
    pub async fn attach(&self, join: PollCommunity) -> AppResult<PollCommunity> {
        let mut tables = self.store.write().await;
        let kind = tables
            .communities
            .get(&join.community_id)
            .map(|c| c.kind)
            .ok_or_else(|| {
                AppError::NotFound(format!("Community not found: {}", join.community_id))
            })?;

        let displaced: Vec<String> = tables
            .poll_communities
            .values()
            .filter(|pc| {
                pc.poll_id == join.poll_id
                    && tables
                        .communities
                        .get(&pc.community_id)
                        .is_some_and(|c| c.kind == kind)
            })
            .map(|pc| pc.id.clone())
            .collect();
        for id in displaced {
            tables.poll_communities.remove(&id);
        }

        tables
            .poll_communities
            .insert(join.id.clone(), join.clone());
        Ok(join)
    }

    /// Remove the poll's community of a kind, if any.
    pub async fn detach_kind(&self, poll_id: &str, kind: CommunityKind) -> AppResult<bool> {
        let mut tables = self.store.write().await;
        let existing: Vec<String> = tables
            .poll_communities
            .values()
            .filter(|pc| {
                pc.poll_id == poll_id
                    && tables
                        .communities
                        .get(&pc.community_id)
                        .is_some_and(|c| c.kind == kind)
            })
            .map(|pc| pc.id.clone())
            .collect();
        let found = !existing.is_empty();
        for id in existing {
            tables.poll_communities.remove(&id);
        }
        Ok(found)
    }

    /// Communities attached to a poll.
    pub async fn for_poll(&self, poll_id: &str) -> AppResult<Vec<Community>> {
        let tables = self.store.read().await;
        let mut communities: Vec<Community> = tables
            .poll_communities
            .values()
            .filter(|pc| pc.poll_id == poll_id)
            .filter_map(|pc| tables.communities.get(&pc.community_id))
            .cloned()
            .collect();
        communities.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(communities)
    }

    /// The poll's community of a given kind, if attached.
    pub async fn of_kind(&self, poll_id: &str, kind: CommunityKind) -> AppResult<Option<Community>> {
        Ok(self
            .for_poll(poll_id)
            .await?
            .into_iter()
            .find(|c| c.kind == kind))
    }

    /// Member user ids of a community.
    ///
    /// Group communities resolve through group membership; explicit
    /// communities carry their own list; public communities have none.
    pub async fn members(&self, community_id: &str) -> AppResult<Vec<String>> {
        let tables = self.store.read().await;
        let community = tables.communities.get(community_id).ok_or_else(|| {
            AppError::NotFound(format!("Community not found: {community_id}"))
        })?;

        let mut members: Vec<String> = match community.kind {
            CommunityKind::Group => {
                let Some(ref group_id) = community.group_id else {
                    return Ok(Vec::new());
                };
                tables
                    .group_memberships
                    .values()
                    .filter(|m| &m.group_id == group_id)
                    .map(|m| m.user_id.clone())
                    .collect()
            }
            CommunityKind::Explicit => community.user_ids.clone(),
            CommunityKind::Public => Vec::new(),
        };
        members.sort_unstable();
        members.dedup();
        Ok(members)
    }
}
