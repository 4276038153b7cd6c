//! Eligibility resolution service.
//!
//! Decides who hears about a poll. Announcements broadcast to the poll's
//! group; targeted events reach the users mentioned in the poll's content.
//! Membership and mention queries are read-only and may run concurrently
//! with vote submission.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use agora_common::AppResult;
use agora_db::records::{CommunityKind, Poll, User, Volume};
use agora_db::repositories::{
    CommunityRepository, DiscussionRepository, GroupRepository, StanceRepository, UserRepository,
};

/// How recipients for a poll event are selected. Chosen once per event,
/// never re-derived downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Broadcast to the poll's whole group.
    Announcement,
    /// Only the users mentioned in the poll's content.
    Targeted,
}

impl Audience {
    /// Map the caller's announcement flag to an audience.
    #[must_use]
    pub const fn from_flag(announcement: bool) -> Self {
        if announcement {
            Self::Announcement
        } else {
            Self::Targeted
        }
    }

    /// Default audience for system-initiated events: polls with a group
    /// broadcast, the rest stay targeted.
    #[must_use]
    pub const fn for_poll(poll: &Poll) -> Self {
        if poll.group_id.is_some() {
            Self::Announcement
        } else {
            Self::Targeted
        }
    }

    /// Whether this is the broadcast audience.
    #[must_use]
    pub const fn is_announcement(self) -> bool {
        matches!(self, Self::Announcement)
    }
}

/// Trait for resolving the users mentioned in a poll's content.
///
/// This allows the engine to consume mention resolution without depending
/// on how the platform parses rich text.
#[async_trait]
pub trait MentionResolver: Send + Sync {
    /// The users this poll mentions.
    async fn resolve_mentions(&self, poll: &Poll) -> AppResult<Vec<User>>;
}

/// Mention resolver that scans `details` for `@username` tokens and matches
/// them against the user store. The author never mentions themself.
#[derive(Clone)]
pub struct TextMentionResolver {
    users: UserRepository,
}

impl TextMentionResolver {
    /// Create a new text mention resolver.
    #[must_use]
    pub const fn new(users: UserRepository) -> Self {
        Self { users }
    }
}

#[async_trait]
impl MentionResolver for TextMentionResolver {
    async fn resolve_mentions(&self, poll: &Poll) -> AppResult<Vec<User>> {
        let mut seen = HashSet::new();
        let mut mentioned = Vec::new();
        for username in extract_mentions(poll.details.as_deref().unwrap_or("")) {
            if !seen.insert(username.clone()) {
                continue;
            }
            if let Some(user) = self.users.find_by_username(&username).await?
                && user.id != poll.author_id
            {
                mentioned.push(user);
            }
        }
        Ok(mentioned)
    }
}

/// Extract @mentions from text.
fn extract_mentions(text: &str) -> Vec<String> {
    let mut mentions = Vec::new();
    for word in text.split_whitespace() {
        if let Some(name) = word.strip_prefix('@') {
            let name = name.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_');
            if !name.is_empty() {
                mentions.push(name.to_string());
            }
        }
    }
    mentions
}

/// Eligibility service for recipient resolution.
#[derive(Clone)]
pub struct EligibilityService {
    groups: GroupRepository,
    discussions: DiscussionRepository,
    communities: CommunityRepository,
    stances: StanceRepository,
    users: UserRepository,
    mention_resolver: Arc<dyn MentionResolver>,
}

impl EligibilityService {
    /// Create a new eligibility service.
    #[must_use]
    pub fn new(
        groups: GroupRepository,
        discussions: DiscussionRepository,
        communities: CommunityRepository,
        stances: StanceRepository,
        users: UserRepository,
        mention_resolver: Arc<dyn MentionResolver>,
    ) -> Self {
        Self {
            groups,
            discussions,
            communities,
            stances,
            users,
            mention_resolver,
        }
    }

    /// Everyone who gets an in-app notification for the event.
    ///
    /// Announcements reach all members of the poll's group; targeted events
    /// reach the mentioned users.
    pub async fn notification_recipients(
        &self,
        poll: &Poll,
        audience: Audience,
    ) -> AppResult<Vec<User>> {
        match audience {
            Audience::Announcement => {
                let Some(ref group_id) = poll.group_id else {
                    tracing::warn!(poll_id = %poll.id, "Announcement on a poll without a group");
                    return Ok(Vec::new());
                };
                let member_ids = self.groups.member_ids(group_id).await?;
                self.users.find_many(&member_ids).await
            }
            Audience::Targeted => Ok(self.mentions(poll).await),
        }
    }

    /// The subset of recipients that also gets an email.
    ///
    /// Announcements email discussion readers at `normal` or `loud` volume;
    /// targeted events email mentioned users who opted into mention email.
    pub async fn email_recipients(&self, poll: &Poll, audience: Audience) -> AppResult<Vec<User>> {
        match audience {
            Audience::Announcement => {
                let Some(ref discussion_id) = poll.discussion_id else {
                    tracing::warn!(poll_id = %poll.id, "Announcement on a poll without a discussion");
                    return Ok(Vec::new());
                };
                let reader_ids = self
                    .discussions
                    .users_by_volume(discussion_id, &[Volume::Normal, Volume::Loud])
                    .await?;
                self.users.find_many(&reader_ids).await
            }
            Audience::Targeted => Ok(self
                .mentions(poll)
                .await
                .into_iter()
                .filter(|u| u.email_when_mentioned)
                .collect()),
        }
    }

    /// Members eligible to vote who have not yet done so.
    ///
    /// The source set is the poll's explicit community when attached, else
    /// its group community, else just the author.
    pub async fn undecided_user_ids(&self, poll: &Poll) -> AppResult<Vec<String>> {
        let source = if let Some(community) = self
            .communities
            .of_kind(&poll.id, CommunityKind::Explicit)
            .await?
        {
            self.communities.members(&community.id).await?
        } else if let Some(community) = self
            .communities
            .of_kind(&poll.id, CommunityKind::Group)
            .await?
        {
            self.communities.members(&community.id).await?
        } else {
            vec![poll.author_id.clone()]
        };

        let voted: HashSet<String> = self
            .stances
            .participant_ids(&poll.id)
            .await?
            .into_iter()
            .collect();
        Ok(source.into_iter().filter(|id| !voted.contains(id)).collect())
    }

    /// Mentioned users, degraded to empty on resolution failure.
    async fn mentions(&self, poll: &Poll) -> Vec<User> {
        match self.mention_resolver.resolve_mentions(poll).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(poll_id = %poll.id, error = %e, "Mention resolution failed");
                Vec::new()
            }
        }
    }
}
