//! Job processing service for background tasks.
//!
//! A simple in-memory job queue that decouples notification dispatch from
//! the validation/save path: saves enqueue and return, a worker pool drains
//! the queue and talks to the external mailer. Mail-transport latency or
//! failure therefore never blocks a poll mutation.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::services::mailer::{MailDelivery, Mailer};

/// Maximum number of concurrent job workers.
const MAX_WORKERS: usize = 4;

/// Channel buffer size for jobs.
const JOB_BUFFER_SIZE: usize = 1000;

/// Job types that can be processed.
#[derive(Debug, Clone)]
pub enum Job {
    /// Hand a resolved notification to the external mailer.
    Mail(Box<MailDelivery>),
}

/// Job sender for enqueueing jobs.
#[derive(Clone)]
pub struct JobSender {
    sender: mpsc::Sender<Job>,
}

impl JobSender {
    /// Enqueue a job for processing.
    pub async fn enqueue(&self, job: Job) -> Result<(), &'static str> {
        self.sender.send(job).await.map_err(|_| "Job queue is full")
    }

    /// Enqueue a mail delivery job.
    pub async fn mail(&self, delivery: MailDelivery) -> Result<(), &'static str> {
        self.enqueue(Job::Mail(Box::new(delivery))).await
    }
}

/// Job worker context containing collaborators needed for job processing.
#[derive(Clone)]
pub struct JobWorkerContext {
    pub mailer: Option<Arc<dyn Mailer>>,
}

/// Job processing service.
pub struct JobService {
    sender: mpsc::Sender<Job>,
    receiver: Option<mpsc::Receiver<Job>>,
}

impl JobService {
    /// Create a new job service.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(JOB_BUFFER_SIZE);
        Self {
            sender,
            receiver: Some(receiver),
        }
    }

    /// Get a job sender for enqueueing jobs.
    #[must_use]
    pub fn sender(&self) -> JobSender {
        JobSender {
            sender: self.sender.clone(),
        }
    }

    /// Start the job processor with the given context.
    /// This consumes the receiver and spawns worker tasks.
    pub fn start(mut self, context: JobWorkerContext) {
        let receiver = self.receiver.take().expect("Job service already started");
        let context = Arc::new(context);

        tokio::spawn(async move {
            info!("Job worker starting with {} workers", MAX_WORKERS);
            run_job_processor(receiver, context).await;
            info!("Job worker stopped");
        });
    }
}

impl Default for JobService {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the job processor.
async fn run_job_processor(mut receiver: mpsc::Receiver<Job>, context: Arc<JobWorkerContext>) {
    // Use a semaphore to limit concurrent workers
    let semaphore = Arc::new(tokio::sync::Semaphore::new(MAX_WORKERS));

    while let Some(job) = receiver.recv().await {
        let permit = semaphore.clone().acquire_owned().await;
        let ctx = context.clone();

        tokio::spawn(async move {
            let _permit = permit;
            process_job(job, &ctx).await;
        });
    }
}

/// Process a single job.
async fn process_job(job: Job, context: &JobWorkerContext) {
    match job {
        Job::Mail(delivery) => process_mail(context, &delivery).await,
    }
}

/// Process a mail delivery job.
async fn process_mail(context: &JobWorkerContext, delivery: &MailDelivery) {
    let Some(ref mailer) = context.mailer else {
        debug!("Mailer not available, skipping delivery");
        return;
    };

    match mailer.deliver(delivery).await {
        Ok(()) => {
            debug!(
                poll_id = %delivery.poll.id,
                kind = %delivery.kind,
                email_count = delivery.email_recipients.len(),
                "Notification delivered"
            );
        }
        Err(e) => {
            // Dispatch failures stay here; they are never a poll error.
            error!(
                poll_id = %delivery.poll.id,
                kind = %delivery.kind,
                error = %e,
                "Failed to deliver notification"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::mailer::{NoOpMailer, TranslationContext};
    use agora_db::records::PollEventKind;

    fn dummy_delivery() -> MailDelivery {
        use std::collections::BTreeMap;
        MailDelivery {
            poll: agora_db::records::Poll {
                id: "p1".to_string(),
                poll_type: "poll".to_string(),
                title: "t".to_string(),
                details: None,
                author_id: "u1".to_string(),
                group_id: None,
                discussion_id: None,
                closing_at: None,
                closed_at: None,
                multiple_choice: false,
                custom_fields: serde_json::Map::new(),
                stance_data: BTreeMap::new(),
                stance_counts: Vec::new(),
                matrix_counts: None,
                stances_count: 0,
                undecided_count: 0,
                created_at: chrono::Utc::now(),
            },
            kind: PollEventKind::PollCreated,
            notification_recipients: Vec::new(),
            email_recipients: Vec::new(),
            context: TranslationContext {
                poll_type: "poll".to_string(),
                title: "t".to_string(),
                group_name: None,
                locale: "en".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_job_sender_enqueue() {
        let service = JobService::new();
        let sender = service.sender();

        service.start(JobWorkerContext {
            mailer: Some(Arc::new(NoOpMailer)),
        });

        let result = sender.mail(dummy_delivery()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_enqueue_without_mailer() {
        let service = JobService::new();
        let sender = service.sender();

        service.start(JobWorkerContext { mailer: None });

        let result = sender.mail(dummy_delivery()).await;
        assert!(result.is_ok());
    }
}
