//! LLM Council Coordination Library
//!
//! This library provides:
//! - Provider clients for Gemini, Groq and the OpenRouter gateway behind one trait
//! - A router that picks the client for a model identifier
//! - A parallel dispatcher that queries a whole council at once
//! - The anonymized debate round: label, critique, rank, de-anonymize
//!
//! # Usage
//!
//! ```rust,ignore
//! use coordination::{CouncilConfig, CouncilDebate, StageResult};
//!
//! let config = CouncilConfig::from_env()?;
//! let debate = CouncilDebate::from_config(&config)?;
//!
//! let stage1 = vec![
//!     StageResult::new("gemini-2.5-flash", "..."),
//!     StageResult::new("llama-3.3-70b-versatile", "..."),
//! ];
//! let round = debate.run_debate("Why is the sky blue?", &stage1, None).await?;
//!
//! for result in &round.results {
//!     println!("{} → {:?}", result.model, result.ranked_models(&round.label_map));
//! }
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod council;
pub mod debate;
pub mod dispatch;
pub mod providers;
pub mod router;

// Re-export key council types
pub use council::{
    short_model_name, CouncilConfig, CouncilError, Message, ModelId, ProviderCredentials,
    ProviderResponse, Role, StageResult, MAX_PARTICIPANTS,
};

// Re-export provider types
pub use providers::{
    GeminiClient, GroqClient, OpenRouterClient, ProviderClient, ProviderError, ProviderKind,
    ProviderOutcome,
};

// Re-export routing and dispatch types
pub use dispatch::{DispatchResults, DispatchSummary, ModelOutcome, ParallelDispatcher};
pub use router::{route, ProviderRouter};

// Re-export debate types
pub use debate::{
    aggregate_rankings, anonymize, build_debate_prompt, parse_ranking, AggregateRanking,
    AnonymizedResponses, CouncilDebate, DebateResult, DebateRound, Label, LabelMap,
    FINAL_RANKING_ANCHOR,
};
