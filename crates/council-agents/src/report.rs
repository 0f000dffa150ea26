//! JSON report for one debate round.

use coordination::{route, short_model_name, DebateResult, DebateRound, LabelMap, ProviderKind};
use serde::Serialize;

/// One row of the aggregate leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub model: String,
    pub display_name: String,
    pub average_rank: f64,
    pub rankings_count: usize,
}

/// Everything printed by `council-agents debate`
#[derive(Debug, Clone, Serialize)]
pub struct DebateReport {
    pub query: String,
    pub results: Vec<DebateResult>,
    pub label_to_model: LabelMap,
    pub aggregate_rankings: Vec<RankingRow>,
}

impl DebateReport {
    pub fn from_round(query: &str, round: DebateRound) -> Self {
        let aggregate_rankings = round
            .aggregate_rankings()
            .into_iter()
            .enumerate()
            .map(|(i, agg)| RankingRow {
                rank: i + 1,
                display_name: short_model_name(&agg.model).to_string(),
                model: agg.model,
                average_rank: agg.average_rank,
                rankings_count: agg.rankings_count,
            })
            .collect();

        Self {
            query: query.to_string(),
            results: round.results,
            label_to_model: round.label_map,
            aggregate_rankings,
        }
    }
}

/// One line of `council-agents council`
#[derive(Debug, Clone, Serialize)]
pub struct CouncilMemberRow {
    pub model: String,
    pub provider: ProviderKind,
    pub credential_env: &'static str,
    pub credential_set: bool,
}

impl CouncilMemberRow {
    pub fn new(model: &str, config: &coordination::CouncilConfig) -> Self {
        let provider = route(model);
        let creds = &config.credentials;
        let credential_set = match provider {
            ProviderKind::Gemini => creds.gemini.is_some(),
            ProviderKind::Groq => creds.groq.is_some(),
            ProviderKind::OpenRouter => creds.openrouter.is_some(),
        };
        Self {
            model: model.to_string(),
            provider,
            credential_env: provider.credential_env(),
            credential_set,
        }
    }
}
