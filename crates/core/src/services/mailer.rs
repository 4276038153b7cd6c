//! Mailer abstraction.
//!
//! Provides an abstraction for handing resolved notifications to the
//! external delivery transport. The engine never renders or sends mail
//! itself; it resolves recipients, builds the translation context, and
//! passes everything through this trait.

use async_trait::async_trait;
use serde::Serialize;

use agora_common::AppResult;
use agora_db::records::{Poll, PollEventKind, User};

/// Values the external renderer interpolates into notification templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationContext {
    /// Localized, lowercased poll type label, e.g. `proposal`.
    pub poll_type: String,
    /// The poll's title, passed through untranslated.
    pub title: String,
    /// Name of the owning group, when the poll has one.
    pub group_name: Option<String>,
    /// Locale the labels were resolved in.
    pub locale: String,
}

/// A notification with resolved recipients, ready for external delivery.
#[derive(Debug, Clone)]
pub struct MailDelivery {
    pub poll: Poll,
    pub kind: PollEventKind,
    /// Everyone who gets an in-app notification.
    pub notification_recipients: Vec<User>,
    /// The subset that also gets an email.
    pub email_recipients: Vec<User>,
    pub context: TranslationContext,
}

/// Trait for the external mail/notification dispatcher.
///
/// Delivery is fire-and-forget from the poll's perspective: implementations
/// own retries and reporting, and their failures never become poll errors.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a resolved notification.
    async fn deliver(&self, delivery: &MailDelivery) -> AppResult<()>;
}

/// Mailer that drops everything, for tests and transports-less deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMailer;

#[async_trait]
impl Mailer for NoOpMailer {
    async fn deliver(&self, delivery: &MailDelivery) -> AppResult<()> {
        tracing::debug!(
            poll_id = %delivery.poll.id,
            kind = %delivery.kind,
            notification_count = delivery.notification_recipients.len(),
            email_count = delivery.email_recipients.len(),
            "Dropping notification delivery (no-op mailer)"
        );
        Ok(())
    }
}
