//! Poll repository.

use chrono::{DateTime, Utc};

use agora_common::{AppError, AppResult};

use crate::records::{Poll, PollEventKind, PollOption};
use crate::store::Store;

/// Poll repository for store operations.
#[derive(Clone)]
pub struct PollRepository {
    store: Store,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, poll_id: &str) -> AppResult<Option<Poll>> {
        Ok(self.store.read().await.polls.get(poll_id).cloned())
    }

    /// Get a poll by ID, returning an error if not found.
    pub async fn get_by_id(&self, poll_id: &str) -> AppResult<Poll> {
        self.find_by_id(poll_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Poll not found: {poll_id}")))
    }

    /// Create a new poll.
    pub async fn create(&self, poll: Poll) -> AppResult<Poll> {
        let mut tables = self.store.write().await;
        if tables.polls.contains_key(&poll.id) {
            return Err(AppError::Store(format!("duplicate poll id: {}", poll.id)));
        }
        tables.polls.insert(poll.id.clone(), poll.clone());
        Ok(poll)
    }

    /// Update an existing poll.
    pub async fn update(&self, poll: Poll) -> AppResult<Poll> {
        let mut tables = self.store.write().await;
        if !tables.polls.contains_key(&poll.id) {
            return Err(AppError::NotFound(format!("Poll not found: {}", poll.id)));
        }
        tables.polls.insert(poll.id.clone(), poll.clone());
        Ok(poll)
    }

    /// Delete a poll and everything it owns: options, stances and their
    /// choices, community joins, and events.
    pub async fn delete(&self, poll_id: &str) -> AppResult<()> {
        let mut tables = self.store.write().await;
        tables.polls.remove(poll_id);

        let option_ids: Vec<String> = tables
            .poll_options
            .values()
            .filter(|o| o.poll_id == poll_id)
            .map(|o| o.id.clone())
            .collect();
        let stance_ids: Vec<String> = tables
            .stances
            .values()
            .filter(|s| s.poll_id == poll_id)
            .map(|s| s.id.clone())
            .collect();

        tables.poll_options.retain(|_, o| o.poll_id != poll_id);
        tables.stances.retain(|_, s| s.poll_id != poll_id);
        tables.stance_choices.retain(|_, c| {
            !stance_ids.contains(&c.stance_id) && !option_ids.contains(&c.poll_option_id)
        });
        tables.poll_communities.retain(|_, pc| pc.poll_id != poll_id);
        tables.poll_events.retain(|_, e| e.poll_id != poll_id);
        tracing::debug!(poll_id = %poll_id, "Deleted poll and owned records");
        Ok(())
    }

    /// Active polls, oldest first.
    pub async fn active(&self) -> AppResult<Vec<Poll>> {
        let tables = self.store.read().await;
        Ok(chronologically(
            tables.polls.values().filter(|p| p.is_active()),
        ))
    }

    /// Closed polls, oldest first.
    pub async fn closed(&self) -> AppResult<Vec<Poll>> {
        let tables = self.store.read().await;
        Ok(chronologically(
            tables.polls.values().filter(|p| !p.is_active()),
        ))
    }

    /// Active polls whose closing time has already passed.
    pub async fn lapsed_but_not_closed(&self, now: DateTime<Utc>) -> AppResult<Vec<Poll>> {
        let tables = self.store.read().await;
        Ok(chronologically(tables.polls.values().filter(|p| {
            p.is_active() && p.closing_at.is_some_and(|at| at < now)
        })))
    }

    /// Polls whose title contains the fragment, case-insensitively.
    pub async fn search_for(&self, fragment: &str) -> AppResult<Vec<Poll>> {
        let needle = fragment.to_lowercase();
        let tables = self.store.read().await;
        Ok(chronologically(
            tables
                .polls
                .values()
                .filter(|p| p.title.to_lowercase().contains(&needle)),
        ))
    }

    /// Polls authored by a user, oldest first.
    pub async fn authored_by(&self, user_id: &str) -> AppResult<Vec<Poll>> {
        let tables = self.store.read().await;
        Ok(chronologically(
            tables.polls.values().filter(|p| p.author_id == user_id),
        ))
    }

    /// Active polls closing inside `(window_start, window_end]` that have no
    /// closing-soon event more recent than `recency_threshold`.
    pub async fn closing_soon_unpublished(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        recency_threshold: DateTime<Utc>,
    ) -> AppResult<Vec<Poll>> {
        let tables = self.store.read().await;
        Ok(chronologically(tables.polls.values().filter(|p| {
            let in_window = p
                .closing_at
                .is_some_and(|at| at > window_start && at <= window_end);
            let published = tables.poll_events.values().any(|e| {
                e.poll_id == p.id
                    && e.kind == PollEventKind::PollClosingSoon
                    && e.created_at > recency_threshold
            });
            p.is_active() && in_window && !published
        })))
    }
}

fn chronologically<'a>(polls: impl Iterator<Item = &'a Poll>) -> Vec<Poll> {
    let mut polls: Vec<Poll> = polls.cloned().collect();
    polls.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    polls
}

/// Poll option repository for store operations.
#[derive(Clone)]
pub struct PollOptionRepository {
    store: Store,
}

impl PollOptionRepository {
    /// Create a new poll option repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a new option.
    pub async fn create(&self, option: PollOption) -> AppResult<PollOption> {
        let mut tables = self.store.write().await;
        if tables
            .poll_options
            .values()
            .any(|o| o.poll_id == option.poll_id && o.name == option.name)
        {
            return Err(AppError::Store(format!(
                "duplicate option name on poll {}: {}",
                option.poll_id, option.name
            )));
        }
        tables.poll_options.insert(option.id.clone(), option.clone());
        Ok(option)
    }

    /// Find an option by ID.
    pub async fn find_by_id(&self, option_id: &str) -> AppResult<Option<PollOption>> {
        Ok(self.store.read().await.poll_options.get(option_id).cloned())
    }

    /// Find an option on a poll by name.
    pub async fn find_by_name(&self, poll_id: &str, name: &str) -> AppResult<Option<PollOption>> {
        Ok(self
            .store
            .read()
            .await
            .poll_options
            .values()
            .find(|o| o.poll_id == poll_id && o.name == name)
            .cloned())
    }

    /// Options of a poll, ordered by priority ascending.
    pub async fn for_poll(&self, poll_id: &str) -> AppResult<Vec<PollOption>> {
        let tables = self.store.read().await;
        let mut options: Vec<PollOption> = tables
            .poll_options
            .values()
            .filter(|o| o.poll_id == poll_id)
            .cloned()
            .collect();
        options.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));
        Ok(options)
    }

    /// Option names of a poll in priority order.
    pub async fn names_for_poll(&self, poll_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .for_poll(poll_id)
            .await?
            .into_iter()
            .map(|o| o.name)
            .collect())
    }

    /// Highest priority currently on the poll.
    pub async fn max_priority(&self, poll_id: &str) -> AppResult<Option<i32>> {
        Ok(self
            .store
            .read()
            .await
            .poll_options
            .values()
            .filter(|o| o.poll_id == poll_id)
            .map(|o| o.priority)
            .max())
    }

    /// Remove options by name, cascading to their stance choices.
    ///
    /// Returns the number of options removed. Callers must recompute the
    /// poll's aggregates afterwards.
    pub async fn remove_by_names(&self, poll_id: &str, names: &[String]) -> AppResult<usize> {
        let mut tables = self.store.write().await;
        let removed_ids: Vec<String> = tables
            .poll_options
            .values()
            .filter(|o| o.poll_id == poll_id && names.contains(&o.name))
            .map(|o| o.id.clone())
            .collect();

        for id in &removed_ids {
            tables.poll_options.remove(id);
        }
        tables
            .stance_choices
            .retain(|_, c| !removed_ids.contains(&c.poll_option_id));
        Ok(removed_ids.len())
    }
}
