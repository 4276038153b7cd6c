//! Test utilities for store operations.
//!
//! Provides fixture builders for seeding users, groups, discussions and
//! communities in tests.

use agora_common::{AppResult, IdGenerator};

use crate::records::{
    Community, CommunityKind, Discussion, DiscussionReader, Group, GroupMembership, User, Volume,
};
use crate::repositories::{
    CommunityRepository, DiscussionRepository, GroupRepository, UserRepository,
};
use crate::store::Store;

/// A store pre-wired with fixture builders.
pub struct TestStore {
    /// The backing store; hand it to the repositories under test.
    pub store: Store,
    id_gen: IdGenerator,
    users: UserRepository,
    groups: GroupRepository,
    discussions: DiscussionRepository,
    communities: CommunityRepository,
}

impl TestStore {
    /// Create an empty test store.
    #[must_use]
    pub fn new() -> Self {
        let store = Store::new();
        Self {
            users: UserRepository::new(store.clone()),
            groups: GroupRepository::new(store.clone()),
            discussions: DiscussionRepository::new(store.clone()),
            communities: CommunityRepository::new(store.clone()),
            id_gen: IdGenerator::new(),
            store,
        }
    }

    /// Seed a user with defaults: english locale, mention emails on.
    pub async fn user(&self, username: &str) -> AppResult<User> {
        self.user_with(username, true, "en").await
    }

    /// Seed a user with explicit mention-email and locale settings.
    pub async fn user_with(
        &self,
        username: &str,
        email_when_mentioned: bool,
        locale: &str,
    ) -> AppResult<User> {
        self.users
            .create(User {
                id: self.id_gen.generate(),
                username: username.to_string(),
                name: None,
                email: format!("{username}@example.com"),
                locale: locale.to_string(),
                email_when_mentioned,
            })
            .await
    }

    /// Seed a group with the given members.
    pub async fn group<S: AsRef<str>>(&self, name: &str, member_ids: &[S]) -> AppResult<Group> {
        let group = self
            .groups
            .create(Group {
                id: self.id_gen.generate(),
                name: name.to_string(),
            })
            .await?;
        for user_id in member_ids {
            self.groups
                .add_member(GroupMembership {
                    id: self.id_gen.generate(),
                    group_id: group.id.clone(),
                    user_id: user_id.as_ref().to_string(),
                })
                .await?;
        }
        Ok(group)
    }

    /// Seed a discussion in a group with readers at given volumes.
    pub async fn discussion(
        &self,
        group_id: &str,
        readers: &[(&str, Volume)],
    ) -> AppResult<Discussion> {
        let discussion = self
            .discussions
            .create(Discussion {
                id: self.id_gen.generate(),
                group_id: group_id.to_string(),
                title: "Test discussion".to_string(),
            })
            .await?;
        for (user_id, volume) in readers {
            self.discussions
                .upsert_reader(DiscussionReader {
                    id: self.id_gen.generate(),
                    discussion_id: discussion.id.clone(),
                    user_id: (*user_id).to_string(),
                    volume: *volume,
                })
                .await?;
        }
        Ok(discussion)
    }

    /// Seed a community backed by a group's membership.
    pub async fn group_community(&self, group_id: &str) -> AppResult<Community> {
        self.communities
            .create(Community {
                id: self.id_gen.generate(),
                kind: CommunityKind::Group,
                group_id: Some(group_id.to_string()),
                user_ids: Vec::new(),
            })
            .await
    }

    /// Seed a community with an explicit user list.
    pub async fn explicit_community<S: AsRef<str>>(&self, user_ids: &[S]) -> AppResult<Community> {
        self.communities
            .create(Community {
                id: self.id_gen.generate(),
                kind: CommunityKind::Explicit,
                group_id: None,
                user_ids: user_ids.iter().map(|id| id.as_ref().to_string()).collect(),
            })
            .await
    }

    /// Seed a public community.
    pub async fn public_community(&self) -> AppResult<Community> {
        self.communities
            .create(Community {
                id: self.id_gen.generate(),
                kind: CommunityKind::Public,
                group_id: None,
                user_ids: Vec::new(),
            })
            .await
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}
