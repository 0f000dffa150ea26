//! Parallel Dispatcher: concurrent fan-out to the council.
//!
//! ```text
//! models[0..n] ──route──▶ client ──JoinSet::spawn──▶ (idx, outcome)
//!                                                       │
//!                              join_next() × n ◀────────┘
//!                                    │
//!                           slots[idx] = outcome
//! ```
//!
//! Every call runs in its own task with its own timeout. A failure, timeout
//! or panic in one task fills only that model's slot; the rest run to
//! completion. Results come back in input order, one entry per model.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::council::{CouncilConfig, CouncilError, Message, ModelId};
use crate::providers::{ProviderError, ProviderKind, ProviderOutcome};
use crate::router::{route, ProviderRouter};

/// Terminal state of one model's call
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    pub model: ModelId,
    pub provider: ProviderKind,
    pub outcome: ProviderOutcome,
}

impl ModelOutcome {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-model outcomes of one dispatch, in input order
#[derive(Debug, Clone, Default)]
pub struct DispatchResults {
    entries: Vec<ModelOutcome>,
}

impl DispatchResults {
    /// Outcome for `model`, if it was dispatched
    pub fn get(&self, model: &str) -> Option<&ProviderOutcome> {
        self.entries
            .iter()
            .find(|e| e.model == model)
            .map(|e| &e.outcome)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelOutcome> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    /// Models whose call failed
    pub fn failed_models(&self) -> Vec<&ModelId> {
        self.entries
            .iter()
            .filter(|e| !e.is_success())
            .map(|e| &e.model)
            .collect()
    }
}

impl IntoIterator for DispatchResults {
    type Item = ModelOutcome;
    type IntoIter = std::vec::IntoIter<ModelOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Compact per-dispatch summary for logs and telemetry
#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: Vec<ModelId>,
}

impl From<&DispatchResults> for DispatchSummary {
    fn from(results: &DispatchResults) -> Self {
        Self {
            dispatched: results.len(),
            succeeded: results.success_count(),
            failed: results.failed_models().into_iter().cloned().collect(),
        }
    }
}

/// Fans one message list out to many models at once
#[derive(Debug, Clone)]
pub struct ParallelDispatcher {
    router: ProviderRouter,
    timeout: Duration,
}

impl ParallelDispatcher {
    pub fn new(router: ProviderRouter, timeout: Duration) -> Self {
        Self { router, timeout }
    }

    /// Dispatcher over the real HTTP clients
    pub fn from_config(config: &CouncilConfig) -> Result<Self, CouncilError> {
        Ok(Self::new(ProviderRouter::from_config(config)?, config.timeout))
    }

    /// Query every model concurrently and wait for all of them.
    ///
    /// Fails only on a malformed model list (empty or with duplicates);
    /// provider failures are reported per model in the returned results.
    pub async fn dispatch(
        &self,
        models: &[ModelId],
        messages: &[Message],
    ) -> Result<DispatchResults, CouncilError> {
        validate_models(models)?;

        let messages: Arc<[Message]> = Arc::from(messages);
        let timeout = self.timeout;
        let mut join_set: JoinSet<(usize, ProviderOutcome)> = JoinSet::new();

        for (idx, model) in models.iter().enumerate() {
            let kind = route(model);
            let client = self.router.client(kind);
            let model = model.clone();
            let messages = Arc::clone(&messages);

            debug!(model = %model, provider = %kind, "dispatching");

            join_set.spawn(async move {
                let outcome =
                    match tokio::time::timeout(timeout, client.call(&model, &messages, timeout))
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            warn!(
                                model = %model,
                                provider = %kind,
                                timeout_secs = timeout.as_secs_f64(),
                                "provider call timed out"
                            );
                            Err(ProviderError::Timeout(timeout))
                        }
                    };
                (idx, outcome)
            });
        }

        let mut slots: Vec<Option<ProviderOutcome>> = models.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, outcome)) => slots[idx] = Some(outcome),
                Err(e) => warn!(error = %e, "provider task panicked"),
            }
        }

        let entries: Vec<ModelOutcome> = models
            .iter()
            .zip(slots)
            .map(|(model, slot)| ModelOutcome {
                model: model.clone(),
                provider: route(model),
                outcome: slot.unwrap_or_else(|| {
                    Err(ProviderError::Aborted("provider task panicked".to_string()))
                }),
            })
            .collect();

        let results = DispatchResults { entries };
        let summary = DispatchSummary::from(&results);
        info!(
            dispatched = summary.dispatched,
            succeeded = summary.succeeded,
            failed = ?summary.failed,
            "dispatch complete"
        );
        Ok(results)
    }
}

fn validate_models(models: &[ModelId]) -> Result<(), CouncilError> {
    if models.is_empty() {
        return Err(CouncilError::NoModels);
    }
    let mut seen = HashSet::with_capacity(models.len());
    for model in models {
        if !seen.insert(model.as_str()) {
            return Err(CouncilError::DuplicateModel(model.clone()));
        }
    }
    Ok(())
}
