//! Anonymized Ranking Debate: stage 2 of the council.
//!
//! Each council member sees every stage-1 answer under a neutral label,
//! critiques them and ends with a ranking block. The labels are mapped
//! back to models only after parsing.
//!
//! # Protocol
//!
//! ```text
//! prompt (prompt.rs)                 reply (ranking.rs)
//! ───────────────────────            ──────────────────────────
//! Response A:\n<answer>              ...free-form critique...
//! Response B:\n<answer>              FINAL RANKING:
//! ...                                1. Response B
//! "FINAL RANKING:" instructions      2. Response A
//! ```

pub mod aggregate;
pub mod anonymizer;
pub mod orchestrator;
pub mod prompt;
pub mod ranking;

pub use aggregate::{aggregate_rankings, AggregateRanking};
pub use anonymizer::{anonymize, AnonymizedResponses, Label, LabelMap, LabeledBlock};
pub use orchestrator::{CouncilDebate, DebateResult, DebateRound};
pub use prompt::build_debate_prompt;
pub use ranking::{extract_labels, parse_ranking, FINAL_RANKING_ANCHOR, MAX_RANKING_LINES};
