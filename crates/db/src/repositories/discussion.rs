//! Discussion repository.

use agora_common::{AppError, AppResult};

use crate::records::{Discussion, DiscussionReader, Volume};
use crate::store::Store;

/// Discussion repository for store operations.
#[derive(Clone)]
pub struct DiscussionRepository {
    store: Store,
}

impl DiscussionRepository {
    /// Create a new discussion repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a discussion.
    pub async fn create(&self, discussion: Discussion) -> AppResult<Discussion> {
        let mut tables = self.store.write().await;
        if tables.discussions.contains_key(&discussion.id) {
            return Err(AppError::Store(format!(
                "duplicate discussion id: {}",
                discussion.id
            )));
        }
        tables
            .discussions
            .insert(discussion.id.clone(), discussion.clone());
        Ok(discussion)
    }

    /// Find a discussion by ID.
    pub async fn find_by_id(&self, discussion_id: &str) -> AppResult<Option<Discussion>> {
        Ok(self.store.read().await.discussions.get(discussion_id).cloned())
    }

    /// Get a discussion by ID, returning an error if not found.
    pub async fn get_by_id(&self, discussion_id: &str) -> AppResult<Discussion> {
        self.find_by_id(discussion_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Discussion not found: {discussion_id}")))
    }

    /// Set a reader's volume preference, replacing any earlier preference.
    pub async fn upsert_reader(&self, reader: DiscussionReader) -> AppResult<()> {
        let mut tables = self.store.write().await;
        let existing: Vec<String> = tables
            .discussion_readers
            .values()
            .filter(|r| r.discussion_id == reader.discussion_id && r.user_id == reader.user_id)
            .map(|r| r.id.clone())
            .collect();
        for id in existing {
            tables.discussion_readers.remove(&id);
        }
        tables.discussion_readers.insert(reader.id.clone(), reader);
        Ok(())
    }

    /// User ids of readers whose volume is one of `volumes`, sorted.
    pub async fn users_by_volume(
        &self,
        discussion_id: &str,
        volumes: &[Volume],
    ) -> AppResult<Vec<String>> {
        let tables = self.store.read().await;
        let mut ids: Vec<String> = tables
            .discussion_readers
            .values()
            .filter(|r| r.discussion_id == discussion_id && volumes.contains(&r.volume))
            .map(|r| r.user_id.clone())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
