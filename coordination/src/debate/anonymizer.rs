//! Anonymizer: order-based labels for stage-1 answers.
//!
//! Answer `i` becomes `Response <'A' + i>`. The label map is rebuilt per
//! round and handed to the caller so a later stage can de-anonymize.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::council::{CouncilError, ModelId, StageResult, MAX_PARTICIPANTS};

/// Prefix shared by label-map keys, prompt sections and ranking lines
pub const RESPONSE_PREFIX: &str = "Response";

/// Single uppercase letter standing in for a model within one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Label(char);

impl Label {
    /// Label for position `index` (0 → A). `None` past Z.
    pub fn from_index(index: usize) -> Option<Self> {
        if index < MAX_PARTICIPANTS {
            Some(Self((b'A' + index as u8) as char))
        } else {
            None
        }
    }

    /// Accepts `A`..=`Z` only
    pub fn from_char(c: char) -> Option<Self> {
        c.is_ascii_uppercase().then_some(Self(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }

    /// Zero-based position this label was assigned from
    pub fn index(self) -> usize {
        (self.0 as u8 - b'A') as usize
    }

    /// Label-map key, e.g. `Response A`
    pub fn key(self) -> String {
        format!("{RESPONSE_PREFIX} {}", self.0)
    }
}

impl TryFrom<char> for Label {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or_else(|| format!("invalid response label {c:?}, expected A-Z"))
    }
}

impl From<Label> for char {
    fn from(label: Label) -> Self {
        label.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bijection `"Response X"` → model for one round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap(BTreeMap<String, ModelId>);

impl LabelMap {
    pub fn model_for(&self, label: Label) -> Option<&ModelId> {
        self.0.get(&label.key())
    }

    /// Look up by raw key such as `Response B`
    pub fn get(&self, key: &str) -> Option<&ModelId> {
        self.0.get(key)
    }

    pub fn contains(&self, label: Label) -> bool {
        self.0.contains_key(&label.key())
    }

    pub fn label_for(&self, model: &str) -> Option<Label> {
        self.labels().find(|l| self.model_for(*l).is_some_and(|m| m == model))
    }

    /// Labels in assignment order
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.0
            .keys()
            .filter_map(|k| k.strip_prefix(RESPONSE_PREFIX))
            .filter_map(|rest| rest.trim().chars().next())
            .filter_map(Label::from_char)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModelId)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One anonymized answer, ready to paste into a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledBlock {
    pub label: Label,
    pub text: String,
}

/// Output of [`anonymize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymizedResponses {
    pub blocks: Vec<LabeledBlock>,
    pub label_map: LabelMap,
}

impl AnonymizedResponses {
    /// All blocks separated by blank lines
    pub fn responses_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Label stage-1 answers by position and build the reverse lookup.
pub fn anonymize(results: &[StageResult]) -> Result<AnonymizedResponses, CouncilError> {
    if results.is_empty() {
        return Err(CouncilError::NoStageResults);
    }
    if results.len() > MAX_PARTICIPANTS {
        return Err(CouncilError::TooManyParticipants {
            got: results.len(),
            max: MAX_PARTICIPANTS,
        });
    }

    let mut seen = HashSet::with_capacity(results.len());
    let mut blocks = Vec::with_capacity(results.len());
    let mut map = BTreeMap::new();

    for (index, result) in results.iter().enumerate() {
        if !seen.insert(result.model.as_str()) {
            return Err(CouncilError::DuplicateModel(result.model.clone()));
        }
        let label = Label::from_index(index).ok_or(CouncilError::TooManyParticipants {
            got: results.len(),
            max: MAX_PARTICIPANTS,
        })?;

        blocks.push(LabeledBlock {
            label,
            text: format!("{}:\n{}", label.key(), result.response),
        });
        map.insert(label.key(), result.model.clone());
    }

    Ok(AnonymizedResponses {
        blocks,
        label_map: LabelMap(map),
    })
}
