//! Stance aggregation service.
//!
//! Recomputes a poll's derived counts from the latest stance per
//! participant. Aggregation runs on demand after a mutation, never
//! continuously; recomputing with no intervening vote change is a no-op by
//! value.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use agora_common::{AppResult, ChartType, PollTemplateRegistry};
use agora_db::records::{Poll, PollOption, StanceChoice};
use agora_db::repositories::{
    PollOptionRepository, PollRepository, StanceChoiceRepository, StanceRepository,
};

use crate::services::eligibility::EligibilityService;

/// Matrix charts show at most this many options and stances.
///
/// A display limit only: scoring is never truncated.
const MATRIX_LIMIT: usize = 5;

/// The derived counts of one poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollCounts {
    /// Option name -> total score. Every current option appears, voted on
    /// or not.
    pub stance_data: BTreeMap<String, i64>,
    /// Totals aligned to option priority order.
    pub stance_counts: Vec<i64>,
    /// Option-by-stance grid, only for matrix chart polls.
    pub matrix_counts: Option<Vec<Vec<bool>>>,
}

/// Aggregation service for derived poll counts.
#[derive(Clone)]
pub struct AggregationService {
    polls: PollRepository,
    options: PollOptionRepository,
    stances: StanceRepository,
    choices: StanceChoiceRepository,
    eligibility: EligibilityService,
    registry: Arc<PollTemplateRegistry>,
}

impl AggregationService {
    /// Create a new aggregation service.
    #[must_use]
    pub fn new(
        polls: PollRepository,
        options: PollOptionRepository,
        stances: StanceRepository,
        choices: StanceChoiceRepository,
        eligibility: EligibilityService,
        registry: Arc<PollTemplateRegistry>,
    ) -> Self {
        Self {
            polls,
            options,
            stances,
            choices,
            eligibility,
            registry,
        }
    }

    /// Recompute and persist a poll's derived counts.
    ///
    /// Idempotent: with no intervening vote or option change, a second run
    /// produces identical output. Zero stances yield all-zero totals.
    pub async fn recompute(&self, poll_id: &str) -> AppResult<PollCounts> {
        let mut poll = self.polls.get_by_id(poll_id).await?;
        let options = self.options.for_poll(poll_id).await?;
        let sums = self.choices.sum_scores_by_option_name(poll_id).await?;

        // Pre-seed every current option with 0 so unvoted options are
        // present, then overlay the summed scores.
        let mut stance_data = BTreeMap::new();
        for option in &options {
            stance_data.insert(
                option.name.clone(),
                sums.get(&option.name).copied().unwrap_or(0),
            );
        }

        let stance_counts: Vec<i64> = options
            .iter()
            .map(|o| stance_data.get(&o.name).copied().unwrap_or(0))
            .collect();

        let matrix_counts = if self.chart_type(&poll) == Some(ChartType::Matrix) {
            Some(self.build_matrix(poll_id, &options).await?)
        } else {
            None
        };

        poll.stance_data = stance_data.clone();
        poll.stance_counts = stance_counts.clone();
        poll.matrix_counts = matrix_counts.clone();
        poll.stances_count = self.stances.count_latest(poll_id).await?;
        poll.undecided_count = self.eligibility.undecided_user_ids(&poll).await?.len() as u64;
        self.polls.update(poll).await?;

        Ok(PollCounts {
            stance_data,
            stance_counts,
            matrix_counts,
        })
    }

    /// Choices grouped by option for display: options in priority order,
    /// choices within each group reasons first. Spans all stances and is
    /// never used for aggregation.
    ///
    /// `since` filters to choices created after it; the default reaches
    /// back a hundred years, i.e. effectively unbounded.
    pub async fn grouped_stance_choices(
        &self,
        poll_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<(PollOption, Vec<StanceChoice>)>> {
        let since = since.unwrap_or_else(|| Utc::now() - Duration::days(365 * 100));
        let options = self.options.for_poll(poll_id).await?;
        let choices = self.choices.for_poll_since(poll_id, since).await?;

        let mut grouped = Vec::new();
        for option in options {
            let group: Vec<StanceChoice> = choices
                .iter()
                .filter(|c| c.poll_option_id == option.id)
                .cloned()
                .collect();
            if !group.is_empty() {
                grouped.push((option, group));
            }
        }
        Ok(grouped)
    }

    /// Boolean grid of option picks: cell `[i][j]` is true iff latest
    /// stance `j` selected option `i`. Both axes cap at [`MATRIX_LIMIT`].
    async fn build_matrix(
        &self,
        poll_id: &str,
        options: &[PollOption],
    ) -> AppResult<Vec<Vec<bool>>> {
        let latest = self.stances.latest_for_poll(poll_id).await?;

        let mut picked_per_stance = Vec::new();
        for stance in latest.iter().take(MATRIX_LIMIT) {
            picked_per_stance.push(self.choices.option_ids_for_stance(&stance.id).await?);
        }

        Ok(options
            .iter()
            .take(MATRIX_LIMIT)
            .map(|option| {
                picked_per_stance
                    .iter()
                    .map(|picked| picked.contains(&option.id))
                    .collect()
            })
            .collect())
    }

    fn chart_type(&self, poll: &Poll) -> Option<ChartType> {
        self.registry.get(&poll.poll_type).map(|t| t.chart_type)
    }
}
