//! Poll service.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use agora_common::{
    AppConfig, AppError, AppResult, IdGenerator, PollTemplate, PollTemplateRegistry,
    ValidationErrors,
};
use agora_db::records::{
    Community, CommunityKind, Poll, PollCommunity, PollEventKind, PollOption,
};
use agora_db::repositories::{
    CommunityRepository, DiscussionRepository, PollOptionRepository, PollRepository,
};

use crate::services::aggregation::AggregationService;
use crate::services::eligibility::Audience;
use crate::services::notification::NotificationRouter;

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePollInput {
    /// Key into the poll template registry.
    pub poll_type: String,
    #[validate(length(min = 1, message = "can't be blank"))]
    pub title: String,
    pub details: Option<String>,
    pub author_id: String,
    pub group_id: Option<String>,
    /// Setting a discussion makes the poll inherit its group.
    pub discussion_id: Option<String>,
    pub closing_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub multiple_choice: bool,
    /// Desired option names in display order. Empty means the template's
    /// default options.
    #[serde(default)]
    pub option_names: Vec<String>,
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
    /// Whether the creation event broadcasts to the whole group.
    #[serde(default)]
    pub announcement: bool,
}

/// The explicit difference a desired option-name sequence makes against the
/// current option set.
///
/// Additions append after the existing maximum priority; removals are
/// staged and only applied after the save validates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSetDiff {
    /// `(name, priority)` pairs to create.
    pub additions: Vec<(String, i32)>,
    /// Names to remove once the save succeeds.
    pub removals: Vec<String>,
}

impl OptionSetDiff {
    /// Diff the desired names against the existing ones. Duplicate desired
    /// names collapse to their first occurrence.
    #[must_use]
    pub fn compute(existing: &[String], desired: &[String], next_priority: i32) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut additions = Vec::new();
        for name in desired {
            if !seen.insert(name.as_str()) {
                continue;
            }
            if !existing.contains(name) {
                let priority = next_priority + additions.len() as i32;
                additions.push((name.clone(), priority));
            }
        }
        let removals = existing
            .iter()
            .filter(|&name| !desired.contains(name))
            .cloned()
            .collect();
        Self { additions, removals }
    }

    /// Whether the diff changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }
}

/// Poll service for lifecycle and option mutation.
#[derive(Clone)]
pub struct PollService {
    polls: PollRepository,
    options: PollOptionRepository,
    communities: CommunityRepository,
    discussions: DiscussionRepository,
    aggregation: AggregationService,
    registry: Arc<PollTemplateRegistry>,
    config: Arc<AppConfig>,
    id_gen: IdGenerator,
    router: Option<NotificationRouter>,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub fn new(
        polls: PollRepository,
        options: PollOptionRepository,
        communities: CommunityRepository,
        discussions: DiscussionRepository,
        aggregation: AggregationService,
        registry: Arc<PollTemplateRegistry>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            polls,
            options,
            communities,
            discussions,
            aggregation,
            registry,
            config,
            id_gen: IdGenerator::new(),
            router: None,
        }
    }

    /// Set the notification router for lifecycle events.
    pub fn set_notification_router(&mut self, router: NotificationRouter) {
        self.router = Some(router);
    }

    /// Create a poll.
    ///
    /// Validates against the poll type's template, persists the poll with
    /// its initial options, attaches the group community, seeds the derived
    /// counts, and publishes the creation event.
    pub async fn create_poll(&self, input: CreatePollInput) -> AppResult<Poll> {
        let mut errors: ValidationErrors = input
            .validate()
            .err()
            .map(Into::into)
            .unwrap_or_default();

        let Some(template) = self.registry.get(&input.poll_type) else {
            errors.add("poll_type", "is not a known poll type");
            return Err(AppError::Validation(errors));
        };

        // Inheriting the group from the discussion keeps the pair
        // consistent even when the caller passes both.
        let group_id = if let Some(ref discussion_id) = input.discussion_id {
            Some(self.discussions.get_by_id(discussion_id).await?.group_id)
        } else {
            input.group_id.clone()
        };

        let names = desired_names(&input.option_names, template);

        let poll = Poll {
            id: self.id_gen.generate(),
            poll_type: input.poll_type,
            title: input.title,
            details: input.details,
            author_id: input.author_id,
            group_id,
            discussion_id: input.discussion_id,
            closing_at: input.closing_at,
            closed_at: None,
            multiple_choice: input.multiple_choice,
            custom_fields: input.custom_fields,
            stance_data: BTreeMap::new(),
            stance_counts: Vec::new(),
            matrix_counts: None,
            stances_count: 0,
            undecided_count: 0,
            created_at: Utc::now(),
        };

        self.validate_poll(&poll, template, &names, &mut errors);
        errors.into_result()?;

        self.polls.create(poll.clone()).await?;
        let diff = OptionSetDiff::compute(&[], &names, 0);
        for (name, priority) in &diff.additions {
            self.options
                .create(PollOption {
                    id: self.id_gen.generate(),
                    poll_id: poll.id.clone(),
                    name: name.clone(),
                    priority: *priority,
                })
                .await?;
        }

        if let Some(ref group_id) = poll.group_id {
            self.attach_group_community(&poll.id, group_id).await?;
        }

        self.aggregation.recompute(&poll.id).await?;
        self.publish(&poll.id, PollEventKind::PollCreated, Audience::from_flag(input.announcement))
            .await;

        self.polls.get_by_id(&poll.id).await
    }

    /// Replace the poll's option set with the desired name sequence.
    ///
    /// Additions and removals are computed as an explicit diff; removals
    /// only apply after validation passes, and the aggregates recompute
    /// afterwards. Publishes an option-added event when options were added.
    pub async fn update_options(
        &self,
        poll_id: &str,
        desired: &[String],
        announcement: bool,
    ) -> AppResult<Poll> {
        let poll = self.polls.get_by_id(poll_id).await?;
        let template = self.registry.get_or_err(&poll.poll_type)?;

        let existing = self.options.names_for_poll(poll_id).await?;
        let next_priority = self
            .options
            .max_priority(poll_id)
            .await?
            .map_or(0, |max| max + 1);
        let diff = OptionSetDiff::compute(&existing, desired, next_priority);

        let post_mutation: Vec<String> = existing
            .iter()
            .filter(|&name| !diff.removals.contains(name))
            .cloned()
            .chain(diff.additions.iter().map(|(name, _)| name.clone()))
            .collect();

        let mut errors = ValidationErrors::new();
        self.validate_poll(&poll, template, &post_mutation, &mut errors);
        errors.into_result()?;

        for (name, priority) in &diff.additions {
            self.options
                .create(PollOption {
                    id: self.id_gen.generate(),
                    poll_id: poll_id.to_string(),
                    name: name.clone(),
                    priority: *priority,
                })
                .await?;
        }
        if !diff.removals.is_empty() {
            self.options.remove_by_names(poll_id, &diff.removals).await?;
        }

        self.aggregation.recompute(poll_id).await?;
        if !diff.additions.is_empty() {
            self.publish(
                poll_id,
                PollEventKind::PollOptionAdded,
                Audience::from_flag(announcement),
            )
            .await;
        }

        self.polls.get_by_id(poll_id).await
    }

    /// Close a poll: set `closed_at`, run a final recompute, publish the
    /// closed event.
    pub async fn close_poll(&self, poll_id: &str) -> AppResult<Poll> {
        let mut poll = self.polls.get_by_id(poll_id).await?;
        if !poll.is_active() {
            let mut errors = ValidationErrors::new();
            errors.add("poll", "is already closed");
            return Err(AppError::Validation(errors));
        }

        poll.closed_at = Some(Utc::now());
        let poll = self.polls.update(poll).await?;
        self.aggregation.recompute(poll_id).await?;
        self.publish(poll_id, PollEventKind::PollClosed, Audience::for_poll(&poll))
            .await;
        self.polls.get_by_id(poll_id).await
    }

    /// Attach or detach the public community: with it attached, anyone may
    /// participate.
    pub async fn set_anyone_can_participate(&self, poll_id: &str, anyone: bool) -> AppResult<()> {
        let poll = self.polls.get_by_id(poll_id).await?;
        if anyone {
            if self
                .communities
                .of_kind(&poll.id, CommunityKind::Public)
                .await?
                .is_none()
            {
                let community = self
                    .communities
                    .create(Community {
                        id: self.id_gen.generate(),
                        kind: CommunityKind::Public,
                        group_id: None,
                        user_ids: Vec::new(),
                    })
                    .await?;
                self.communities
                    .attach(PollCommunity {
                        id: self.id_gen.generate(),
                        poll_id: poll.id.clone(),
                        community_id: community.id,
                    })
                    .await?;
            }
        } else {
            self.communities
                .detach_kind(&poll.id, CommunityKind::Public)
                .await?;
        }
        Ok(())
    }

    /// Whether anyone may participate in the poll.
    pub async fn anyone_can_participate(&self, poll_id: &str) -> AppResult<bool> {
        Ok(self
            .communities
            .of_kind(poll_id, CommunityKind::Public)
            .await?
            .is_some())
    }

    /// The template validation state machine, evaluated at save time.
    /// Violations collect; nothing short-circuits.
    fn validate_poll(
        &self,
        poll: &Poll,
        template: &PollTemplate,
        option_names: &[String],
        errors: &mut ValidationErrors,
    ) {
        if let Some(ref details) = poll.details
            && details.chars().count() > self.config.max_message_length
        {
            errors.add("details", "is too long");
        }

        if !template.can_add_options
            && option_names
                .iter()
                .any(|name| !template.default_options.contains(name))
        {
            errors.add("poll_options", "cannot add options");
        }
        if !template.can_remove_options
            && template
                .default_options
                .iter()
                .any(|name| !option_names.contains(name))
        {
            errors.add("poll_options", "cannot remove options");
        }
        if template.must_have_options && option_names.is_empty() {
            errors.add("poll_options", "must have options");
        }

        for field in &template.required_custom_fields {
            if poll.custom_field_blank(field) {
                errors.add(field.clone(), "can't be blank");
            } else if field == "time_zone"
                && let Some(Value::String(zone)) = poll.custom_field(field)
                && zone.parse::<chrono_tz::Tz>().is_err()
            {
                errors.add(field.clone(), "is not a valid time zone");
            }
        }

        if poll.is_active()
            && let Some(closing_at) = poll.closing_at
            && closing_at <= Utc::now()
        {
            errors.add("closing_at", "must be in the future");
        }
    }

    async fn attach_group_community(&self, poll_id: &str, group_id: &str) -> AppResult<()> {
        let community = self
            .communities
            .create(Community {
                id: self.id_gen.generate(),
                kind: CommunityKind::Group,
                group_id: Some(group_id.to_string()),
                user_ids: Vec::new(),
            })
            .await?;
        self.communities
            .attach(PollCommunity {
                id: self.id_gen.generate(),
                poll_id: poll_id.to_string(),
                community_id: community.id,
            })
            .await?;
        Ok(())
    }

    /// Publish a lifecycle event. Routing failures are logged, never
    /// surfaced as poll errors.
    async fn publish(&self, poll_id: &str, kind: PollEventKind, audience: Audience) {
        if let Some(ref router) = self.router
            && let Err(e) = router.publish(poll_id, kind, audience).await
        {
            tracing::warn!(poll_id = %poll_id, kind = %kind, error = %e, "Failed to publish poll event");
        }
    }
}

/// The option names a new poll starts with: the caller's, or the
/// template's defaults when the caller names none.
fn desired_names(input_names: &[String], template: &PollTemplate) -> Vec<String> {
    if input_names.is_empty() {
        template.default_options.clone()
    } else {
        input_names.to_vec()
    }
}
