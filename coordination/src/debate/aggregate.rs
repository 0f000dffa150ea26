//! Aggregate ranking across all critiques of one round.
//!
//! Each parsed ranking contributes a 1-based position per label; a model's
//! score is its mean position. Lower is better.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::anonymizer::LabelMap;
use super::orchestrator::DebateResult;
use crate::council::ModelId;

/// Mean position of one model across every ranking that named it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRanking {
    pub model: ModelId,
    /// Rounded to two decimals
    pub average_rank: f64,
    pub rankings_count: usize,
}

/// Best first; ties broken by model identifier. Unranked models are omitted.
pub fn aggregate_rankings(results: &[DebateResult], label_map: &LabelMap) -> Vec<AggregateRanking> {
    let mut positions: BTreeMap<&ModelId, Vec<usize>> = BTreeMap::new();

    for result in results {
        for (pos, label) in result.parsed_ranking.iter().enumerate() {
            if let Some(model) = label_map.model_for(*label) {
                positions.entry(model).or_default().push(pos + 1);
            }
        }
    }

    let mut aggregate: Vec<AggregateRanking> = positions
        .into_iter()
        .map(|(model, ranks)| {
            let mean = ranks.iter().sum::<usize>() as f64 / ranks.len() as f64;
            AggregateRanking {
                model: model.clone(),
                average_rank: (mean * 100.0).round() / 100.0,
                rankings_count: ranks.len(),
            }
        })
        .collect();

    aggregate.sort_by(|a, b| {
        a.average_rank
            .total_cmp(&b.average_rank)
            .then_with(|| a.model.cmp(&b.model))
    });
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::StageResult;
    use crate::debate::anonymizer::{anonymize, Label};

    fn result(model: &str, order: &str) -> DebateResult {
        DebateResult {
            model: model.to_string(),
            raw_critique: Some(String::new()),
            parsed_ranking: order.chars().filter_map(Label::from_char).collect(),
            error: None,
        }
    }

    fn map() -> LabelMap {
        anonymize(&[
            StageResult::new("m1", "a"),
            StageResult::new("m2", "b"),
            StageResult::new("m3", "c"),
        ])
        .unwrap()
        .label_map
    }

    #[test]
    fn test_average_positions() {
        let results = vec![result("m1", "BAC"), result("m2", "BCA"), result("m3", "ABC")];
        let agg = aggregate_rankings(&results, &map());

        let models: Vec<&str> = agg.iter().map(|a| a.model.as_str()).collect();
        assert_eq!(models, vec!["m2", "m1", "m3"]);
        assert_eq!(agg[0].average_rank, 1.33);
        assert_eq!(agg[1].average_rank, 2.0);
        assert_eq!(agg[2].average_rank, 2.67);
        assert!(agg.iter().all(|a| a.rankings_count == 3));
    }

    #[test]
    fn test_empty_rankings_and_unknown_labels_are_skipped() {
        let results = vec![result("m1", ""), result("m2", "CZ"), result("m3", "")];
        let agg = aggregate_rankings(&results, &map());
        assert_eq!(agg.len(), 1);
        assert_eq!(agg[0].model, "m3");
        assert_eq!(agg[0].average_rank, 1.0);
        assert_eq!(agg[0].rankings_count, 1);
    }

    #[test]
    fn test_ties_broken_by_model() {
        let results = vec![result("m1", "BA"), result("m2", "AB")];
        let agg = aggregate_rankings(&results, &map());
        let models: Vec<&str> = agg.iter().map(|a| a.model.as_str()).collect();
        assert_eq!(models, vec!["m1", "m2"]);
        assert_eq!(agg[0].average_rank, agg[1].average_rank);
    }
}
