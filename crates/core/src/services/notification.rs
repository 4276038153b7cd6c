//! Notification routing service.

use std::sync::Arc;

use chrono::{Duration, Utc};

use agora_common::{poll_type_label, AppConfig, AppResult, IdGenerator};
use agora_db::records::{Poll, PollEvent, PollEventKind, User};
use agora_db::repositories::{GroupRepository, PollEventRepository, PollRepository, UserRepository};

use crate::services::eligibility::{Audience, EligibilityService};
use crate::services::jobs::JobSender;
use crate::services::mailer::{MailDelivery, TranslationContext};

/// Notification router: resolves recipients for a poll event and hands the
/// delivery to the job queue.
///
/// Dispatch is fire-and-forget from the poll's perspective. Recipient
/// resolution degrades to empty sets, enqueue failures are logged, and
/// transport failures stay inside the queue worker; none of them propagate
/// back as poll errors.
#[derive(Clone)]
pub struct NotificationRouter {
    polls: PollRepository,
    groups: GroupRepository,
    users: UserRepository,
    events: PollEventRepository,
    eligibility: EligibilityService,
    job_sender: JobSender,
    config: Arc<AppConfig>,
    id_gen: IdGenerator,
}

impl NotificationRouter {
    /// Create a new notification router.
    #[must_use]
    pub fn new(
        polls: PollRepository,
        groups: GroupRepository,
        users: UserRepository,
        events: PollEventRepository,
        eligibility: EligibilityService,
        job_sender: JobSender,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            polls,
            groups,
            users,
            events,
            eligibility,
            job_sender,
            config,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a poll event: resolve recipients, record the event, enqueue
    /// the delivery.
    pub async fn publish(
        &self,
        poll_id: &str,
        kind: PollEventKind,
        audience: Audience,
    ) -> AppResult<()> {
        let poll = self.polls.get_by_id(poll_id).await?;

        let notification_recipients = self.resolve_notification_recipients(&poll, audience).await;
        let email_recipients = self.resolve_email_recipients(&poll, audience).await;
        let context = self.translation_context(&poll).await;

        self.events
            .create(PollEvent {
                id: self.id_gen.generate(),
                poll_id: poll.id.clone(),
                kind,
                created_at: Utc::now(),
            })
            .await?;

        let delivery = MailDelivery {
            poll,
            kind,
            notification_recipients,
            email_recipients,
            context,
        };
        if let Err(e) = self.job_sender.mail(delivery).await {
            tracing::warn!(poll_id = %poll_id, kind = %kind, error = %e, "Failed to enqueue notification delivery");
        }
        Ok(())
    }

    /// Publish closing-soon notices for active polls closing within
    /// `window`, skipping polls already notified inside the recency
    /// threshold. Returns the ids of the polls published.
    pub async fn publish_closing_soon(&self, window: Duration) -> AppResult<Vec<String>> {
        let now = Utc::now();
        let recency_threshold = now - Duration::hours(self.config.closing_soon_recency_hours);
        let due = self
            .polls
            .closing_soon_unpublished(now, now + window, recency_threshold)
            .await?;

        let mut published = Vec::new();
        for poll in due {
            let audience = Audience::for_poll(&poll);
            match self
                .publish(&poll.id, PollEventKind::PollClosingSoon, audience)
                .await
            {
                Ok(()) => published.push(poll.id),
                Err(e) => {
                    tracing::warn!(poll_id = %poll.id, error = %e, "Failed to publish closing-soon notice");
                }
            }
        }
        Ok(published)
    }

    /// Context the external renderer interpolates into templates: the poll
    /// type label localized to the author's locale and lowercased, the
    /// title, and the group name.
    async fn translation_context(&self, poll: &Poll) -> TranslationContext {
        let locale = match self.users.find_by_id(&poll.author_id).await {
            Ok(Some(author)) => author.locale,
            _ => self.config.default_locale.clone(),
        };

        let group_name = if let Some(ref group_id) = poll.group_id {
            self.groups
                .find_by_id(group_id)
                .await
                .ok()
                .flatten()
                .map(|g| g.name)
        } else {
            None
        };

        TranslationContext {
            poll_type: poll_type_label(&locale, &poll.poll_type),
            title: poll.title.clone(),
            group_name,
            locale,
        }
    }

    async fn resolve_notification_recipients(&self, poll: &Poll, audience: Audience) -> Vec<User> {
        match self.eligibility.notification_recipients(poll, audience).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(poll_id = %poll.id, error = %e, "Notification recipient resolution failed");
                Vec::new()
            }
        }
    }

    async fn resolve_email_recipients(&self, poll: &Poll, audience: Audience) -> Vec<User> {
        match self.eligibility.email_recipients(poll, audience).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!(poll_id = %poll.id, error = %e, "Email recipient resolution failed");
                Vec::new()
            }
        }
    }
}
