//! Business logic services.

#![allow(missing_docs)]

pub mod aggregation;
pub mod eligibility;
pub mod jobs;
pub mod mailer;
pub mod notification;
pub mod poll;
pub mod stance;

pub use aggregation::{AggregationService, PollCounts};
pub use eligibility::{Audience, EligibilityService, MentionResolver, TextMentionResolver};
pub use jobs::{Job, JobSender, JobService, JobWorkerContext};
pub use mailer::{MailDelivery, Mailer, NoOpMailer, TranslationContext};
pub use notification::NotificationRouter;
pub use poll::{CreatePollInput, OptionSetDiff, PollService};
pub use stance::{CastStanceInput, StanceChoiceInput, StanceService};
