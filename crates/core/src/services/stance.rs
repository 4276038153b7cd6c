//! Stance service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use agora_common::{AppResult, IdGenerator, PollTemplate, PollTemplateRegistry, ValidationErrors};
use agora_db::records::{Poll, Stance, StanceChoice};
use agora_db::repositories::{PollOptionRepository, PollRepository, StanceRepository};

use crate::services::aggregation::AggregationService;

/// One option pick within a vote.
#[derive(Debug, Clone, Deserialize)]
pub struct StanceChoiceInput {
    pub option_name: String,
    /// Ignored unless the poll type scores variably; fixed-score types
    /// count every pick as 1.
    #[serde(default = "default_score")]
    pub score: i64,
}

const fn default_score() -> i64 {
    1
}

/// Input for casting a stance.
#[derive(Debug, Clone, Deserialize)]
pub struct CastStanceInput {
    pub poll_id: String,
    pub participant_id: String,
    pub choices: Vec<StanceChoiceInput>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Stance service for vote recording.
#[derive(Clone)]
pub struct StanceService {
    polls: PollRepository,
    options: PollOptionRepository,
    stances: StanceRepository,
    aggregation: AggregationService,
    registry: Arc<PollTemplateRegistry>,
    id_gen: IdGenerator,
}

impl StanceService {
    /// Create a new stance service.
    #[must_use]
    pub fn new(
        polls: PollRepository,
        options: PollOptionRepository,
        stances: StanceRepository,
        aggregation: AggregationService,
        registry: Arc<PollTemplateRegistry>,
    ) -> Self {
        Self {
            polls,
            options,
            stances,
            aggregation,
            registry,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a participant's vote.
    ///
    /// The new stance replaces the participant's previous one atomically:
    /// the prior stance keeps its history but loses the latest flag, so
    /// aggregation only ever counts one stance per participant. Last write
    /// wins; no poll-wide lock is taken.
    pub async fn cast_stance(&self, input: CastStanceInput) -> AppResult<Stance> {
        let poll = self.polls.get_by_id(&input.poll_id).await?;
        let template = self.registry.get_or_err(&poll.poll_type)?;

        let mut errors = ValidationErrors::new();
        if !poll.is_active() {
            errors.add("poll", "is closed");
        }
        if input.choices.is_empty() {
            errors.add("stance_choices", "can't be blank");
        }
        if is_single_vote(template, &poll) && input.choices.len() > 1 {
            errors.add("stance_choices", "must pick a single option");
        }

        let mut picked: HashSet<&str> = HashSet::new();
        let mut resolved = Vec::new();
        for choice in &input.choices {
            if !picked.insert(choice.option_name.as_str()) {
                errors.add(
                    "stance_choices",
                    format!("{} is picked more than once", choice.option_name),
                );
                continue;
            }
            match self
                .options
                .find_by_name(&input.poll_id, &choice.option_name)
                .await?
            {
                Some(option) => resolved.push((option, choice.score)),
                None => errors.add(
                    "stance_choices",
                    format!("{} is not an option on this poll", choice.option_name),
                ),
            }
        }
        errors.into_result()?;

        let stance = Stance {
            id: self.id_gen.generate(),
            poll_id: input.poll_id.clone(),
            participant_id: input.participant_id,
            latest: true,
            reason: input.reason.clone(),
            cast_at: Utc::now(),
        };
        let has_reason = input.reason.is_some();
        let choices: Vec<StanceChoice> = resolved
            .into_iter()
            .map(|(option, score)| StanceChoice {
                id: self.id_gen.generate(),
                stance_id: stance.id.clone(),
                poll_option_id: option.id,
                score: if template.has_variable_score { score } else { 1 },
                has_reason,
                created_at: Utc::now(),
            })
            .collect();

        let stance = self.stances.replace_latest(stance, choices).await?;
        self.aggregation.recompute(&input.poll_id).await?;
        Ok(stance)
    }
}

/// A stance picks exactly one option when the template says single choice
/// and the poll has not opted into multiple choice.
fn is_single_vote(template: &PollTemplate, poll: &Poll) -> bool {
    template.single_choice && !poll.multiple_choice
}
