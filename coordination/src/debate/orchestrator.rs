//! Debate round orchestration.
//!
//! ```text
//! stage-1 results ─▶ anonymize ─▶ build prompt ─▶ dispatch to council
//!                        │                              │
//!                        ▼                              ▼
//!                    LabelMap ◀──── parse ranking ◀── critiques
//! ```
//!
//! Every dispatched model gets a [`DebateResult`], including the ones whose
//! provider call failed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::aggregate::{aggregate_rankings, AggregateRanking};
use super::anonymizer::{anonymize, Label, LabelMap};
use super::prompt::build_debate_prompt;
use super::ranking::parse_ranking;
use crate::council::{CouncilConfig, CouncilError, ModelId, StageResult};
use crate::dispatch::ParallelDispatcher;

/// One council member's critique of the anonymized answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateResult {
    pub model: ModelId,
    /// Full critique text; `None` when the provider call failed
    pub raw_critique: Option<String>,
    /// Best first; empty when no valid ranking block was found
    pub parsed_ranking: Vec<Label>,
    /// Provider failure, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DebateResult {
    pub fn succeeded(&self) -> bool {
        self.raw_critique.is_some()
    }

    /// The ranking with labels translated back to models
    pub fn ranked_models<'a>(&self, label_map: &'a LabelMap) -> Vec<&'a ModelId> {
        self.parsed_ranking
            .iter()
            .filter_map(|label| label_map.model_for(*label))
            .collect()
    }
}

/// Everything a downstream stage needs from one debate round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRound {
    /// One entry per dispatched model, in dispatch order
    pub results: Vec<DebateResult>,
    pub label_map: LabelMap,
}

impl DebateRound {
    pub fn aggregate_rankings(&self) -> Vec<AggregateRanking> {
        aggregate_rankings(&self.results, &self.label_map)
    }

    pub fn de_anonymize(&self, label: Label) -> Option<&ModelId> {
        self.label_map.model_for(label)
    }

    pub fn result_for(&self, model: &str) -> Option<&DebateResult> {
        self.results.iter().find(|r| r.model == model)
    }
}

/// Runs stage 2: every council member critiques and ranks the stage-1 answers
#[derive(Debug, Clone)]
pub struct CouncilDebate {
    dispatcher: ParallelDispatcher,
    council: Vec<ModelId>,
}

impl CouncilDebate {
    pub fn new(dispatcher: ParallelDispatcher, council: Vec<ModelId>) -> Self {
        Self {
            dispatcher,
            council,
        }
    }

    /// Debate over the real provider clients and the configured council
    pub fn from_config(config: &CouncilConfig) -> Result<Self, CouncilError> {
        config.validate()?;
        Ok(Self::new(
            ParallelDispatcher::from_config(config)?,
            config.council_models.clone(),
        ))
    }

    /// Run one debate round.
    ///
    /// `active_models` of `None` or an empty slice means the full council.
    /// Fails only on contract violations: no stage-1 results, more than 26
    /// of them, duplicate models, or no models to ask.
    pub async fn run_debate(
        &self,
        user_query: &str,
        stage1_results: &[StageResult],
        active_models: Option<&[ModelId]>,
    ) -> Result<DebateRound, CouncilError> {
        let anonymized = anonymize(stage1_results)?;
        let prompt = build_debate_prompt(user_query, &anonymized);

        let models = match active_models {
            Some(models) if !models.is_empty() => models,
            _ => self.council.as_slice(),
        };

        info!(
            participants = anonymized.blocks.len(),
            critics = models.len(),
            "starting debate round"
        );

        let dispatched = self.dispatcher.dispatch(models, &[prompt]).await?;
        let label_map = anonymized.label_map;

        let results: Vec<DebateResult> = dispatched
            .into_iter()
            .map(|entry| match entry.outcome {
                Ok(response) => {
                    let parsed_ranking = parse_ranking(&response.content, &label_map);
                    if parsed_ranking.is_empty() {
                        debug!(model = %entry.model, "no ranking found in critique");
                    }
                    DebateResult {
                        model: entry.model,
                        raw_critique: Some(response.content),
                        parsed_ranking,
                        error: None,
                    }
                }
                Err(e) => DebateResult {
                    model: entry.model,
                    raw_critique: None,
                    parsed_ranking: Vec::new(),
                    error: Some(e.to_string()),
                },
            })
            .collect();

        info!(
            critiques = results.iter().filter(|r| r.succeeded()).count(),
            rankings = results.iter().filter(|r| !r.parsed_ranking.is_empty()).count(),
            total = results.len(),
            "debate round complete"
        );

        Ok(DebateRound { results, label_map })
    }
}
