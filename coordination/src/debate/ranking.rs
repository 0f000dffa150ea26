//! Ranking Parser: recover an ordered label list from free-text critique.
//!
//! The prompt asks for a block like:
//!
//! ```text
//! FINAL RANKING:
//! 1. Response B
//! 2. Response A
//! ```
//!
//! Parsing is best-effort and never fails. No anchor means no ranking;
//! nothing is inferred from surrounding prose.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::anonymizer::{Label, LabelMap};

/// Literal header the debate prompt asks for. Shared with the prompt builder.
pub const FINAL_RANKING_ANCHOR: &str = "FINAL RANKING:";

/// Lines scanned after the anchor before giving up
pub const MAX_RANKING_LINES: usize = 30;

/// Blank lines in a row that end the list once an entry was seen
const LIST_END_BLANK_RUN: usize = 2;

static RANKED_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bResponse\s+([A-Z])\b").expect("RANKED_ENTRY regex should compile")
});

/// Labels named after the last anchor, in order, first occurrence only.
///
/// Does not check membership in any label map; see [`parse_ranking`].
pub fn extract_labels(text: &str) -> Vec<Label> {
    let Some(pos) = text.rfind(FINAL_RANKING_ANCHOR) else {
        return Vec::new();
    };
    let tail = &text[pos + FINAL_RANKING_ANCHOR.len()..];

    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    let mut blank_run = 0;

    for line in tail.lines().take(MAX_RANKING_LINES) {
        if line.trim().is_empty() {
            blank_run += 1;
            if !labels.is_empty() && blank_run >= LIST_END_BLANK_RUN {
                break;
            }
            continue;
        }
        blank_run = 0;

        let label = RANKED_ENTRY
            .captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().chars().next())
            .and_then(Label::from_char);

        if let Some(label) = label {
            if seen.insert(label) {
                labels.push(label);
            }
        }
    }

    labels
}

/// Ranking for one critique, restricted to labels in this round's map.
pub fn parse_ranking(text: &str, label_map: &LabelMap) -> Vec<Label> {
    extract_labels(text)
        .into_iter()
        .filter(|label| label_map.contains(*label))
        .collect()
}
