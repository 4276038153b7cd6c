//! Poll event repository.

use chrono::{DateTime, Utc};

use agora_common::{AppError, AppResult};

use crate::records::{PollEvent, PollEventKind};
use crate::store::Store;

/// Poll event repository for store operations.
#[derive(Clone)]
pub struct PollEventRepository {
    store: Store,
}

impl PollEventRepository {
    /// Create a new poll event repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record a published event.
    pub async fn create(&self, event: PollEvent) -> AppResult<PollEvent> {
        let mut tables = self.store.write().await;
        if tables.poll_events.contains_key(&event.id) {
            return Err(AppError::Store(format!("duplicate event id: {}", event.id)));
        }
        tables.poll_events.insert(event.id.clone(), event.clone());
        Ok(event)
    }

    /// Events of a poll, oldest first.
    pub async fn for_poll(&self, poll_id: &str) -> AppResult<Vec<PollEvent>> {
        let tables = self.store.read().await;
        let mut events: Vec<PollEvent> = tables
            .poll_events
            .values()
            .filter(|e| e.poll_id == poll_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    /// Whether an event of this kind was recorded after `since`.
    pub async fn has_kind_since(
        &self,
        poll_id: &str,
        kind: PollEventKind,
        since: DateTime<Utc>,
    ) -> AppResult<bool> {
        let tables = self.store.read().await;
        Ok(tables
            .poll_events
            .values()
            .any(|e| e.poll_id == poll_id && e.kind == kind && e.created_at > since))
    }
}
