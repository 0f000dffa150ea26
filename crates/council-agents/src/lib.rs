//! Command-line front end for the LLM council debate round.

pub mod config;
pub mod report;
