//! Stance repository.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use agora_common::{AppError, AppResult};

use crate::records::{Stance, StanceChoice};
use crate::store::Store;

/// Stance repository for store operations.
#[derive(Clone)]
pub struct StanceRepository {
    store: Store,
}

impl StanceRepository {
    /// Create a new stance repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Record a stance as the participant's latest, with its choices.
    ///
    /// All of the participant's prior stances on the poll are flagged
    /// `latest = false` and the new stance inserted `latest = true` under a
    /// single write guard, so aggregation never observes two latest stances
    /// for one participant.
    pub async fn replace_latest(
        &self,
        stance: Stance,
        choices: Vec<StanceChoice>,
    ) -> AppResult<Stance> {
        let mut tables = self.store.write().await;
        if tables.stances.contains_key(&stance.id) {
            return Err(AppError::Store(format!("duplicate stance id: {}", stance.id)));
        }

        for prior in tables.stances.values_mut() {
            if prior.poll_id == stance.poll_id && prior.participant_id == stance.participant_id {
                prior.latest = false;
            }
        }

        let mut stance = stance;
        stance.latest = true;
        tables.stances.insert(stance.id.clone(), stance.clone());
        for choice in choices {
            tables.stance_choices.insert(choice.id.clone(), choice);
        }
        tracing::debug!(
            poll_id = %stance.poll_id,
            participant_id = %stance.participant_id,
            "Recorded latest stance"
        );
        Ok(stance)
    }

    /// Find a stance by ID.
    pub async fn find_by_id(&self, stance_id: &str) -> AppResult<Option<Stance>> {
        Ok(self.store.read().await.stances.get(stance_id).cloned())
    }

    /// Latest stances of a poll, ordered by cast time ascending.
    pub async fn latest_for_poll(&self, poll_id: &str) -> AppResult<Vec<Stance>> {
        let tables = self.store.read().await;
        let mut stances: Vec<Stance> = tables
            .stances
            .values()
            .filter(|s| s.poll_id == poll_id && s.latest)
            .cloned()
            .collect();
        stances.sort_by(|a, b| a.cast_at.cmp(&b.cast_at).then(a.id.cmp(&b.id)));
        Ok(stances)
    }

    /// Number of latest stances on a poll.
    pub async fn count_latest(&self, poll_id: &str) -> AppResult<u64> {
        let tables = self.store.read().await;
        Ok(tables
            .stances
            .values()
            .filter(|s| s.poll_id == poll_id && s.latest)
            .count() as u64)
    }

    /// Distinct participants who have ever cast a stance on the poll.
    pub async fn participant_ids(&self, poll_id: &str) -> AppResult<Vec<String>> {
        let tables = self.store.read().await;
        let mut ids: Vec<String> = tables
            .stances
            .values()
            .filter(|s| s.poll_id == poll_id)
            .map(|s| s.participant_id.clone())
            .collect::<HashSet<String>>()
            .into_iter()
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Stance choice repository for store operations.
#[derive(Clone)]
pub struct StanceChoiceRepository {
    store: Store,
}

impl StanceChoiceRepository {
    /// Create a new stance choice repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Raw aggregate: summed choice scores of latest stances, grouped by
    /// option name. Options nobody picked are absent; choices whose option
    /// has been removed are excluded by the join.
    pub async fn sum_scores_by_option_name(
        &self,
        poll_id: &str,
    ) -> AppResult<HashMap<String, i64>> {
        let tables = self.store.read().await;
        let latest_stance_ids: HashSet<&str> = tables
            .stances
            .values()
            .filter(|s| s.poll_id == poll_id && s.latest)
            .map(|s| s.id.as_str())
            .collect();

        let mut sums: HashMap<String, i64> = HashMap::new();
        for choice in tables.stance_choices.values() {
            if !latest_stance_ids.contains(choice.stance_id.as_str()) {
                continue;
            }
            let Some(option) = tables.poll_options.get(&choice.poll_option_id) else {
                continue;
            };
            *sums.entry(option.name.clone()).or_insert(0) += choice.score;
        }
        Ok(sums)
    }

    /// Choices of a poll created after `since`, reasons first, then oldest
    /// first. Spans all stances, not just latest; display only.
    pub async fn for_poll_since(
        &self,
        poll_id: &str,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<StanceChoice>> {
        let tables = self.store.read().await;
        let stance_ids: HashSet<&str> = tables
            .stances
            .values()
            .filter(|s| s.poll_id == poll_id)
            .map(|s| s.id.as_str())
            .collect();

        let mut choices: Vec<StanceChoice> = tables
            .stance_choices
            .values()
            .filter(|c| stance_ids.contains(c.stance_id.as_str()) && c.created_at > since)
            .cloned()
            .collect();
        choices.sort_by(|a, b| {
            b.has_reason
                .cmp(&a.has_reason)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(choices)
    }

    /// Option ids a stance selected.
    pub async fn option_ids_for_stance(&self, stance_id: &str) -> AppResult<Vec<String>> {
        let tables = self.store.read().await;
        let mut choices: Vec<&StanceChoice> = tables
            .stance_choices
            .values()
            .filter(|c| c.stance_id == stance_id)
            .collect();
        choices.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(choices.iter().map(|c| c.poll_option_id.clone()).collect())
    }
}
