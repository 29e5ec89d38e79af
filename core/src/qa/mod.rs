//! Question-answer data model
//!
//! Every synthesized question carries a question type, which fixes its rung
//! in the causal hierarchy, and an answer type. Actual-cause questions are
//! answered once per formal semantics, so their answer is a map keyed by
//! semantics rather than a single index set.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod battery;

pub use self::battery::*;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Level of the causal hierarchy a question probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rung {
    /// Association
    Discovery,
    Intervention,
    /// Counterfactuals, actual causation and responsibility
    Counterfactual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    CausalityIdentification,
    CausalAttribution,
    IndividualCausalEffect,
    CounterfactualReasoning,
    SufficientCause,
    NecessaryCause,
    ActualCause,
    Responsibility,
}

impl QuestionType {
    pub fn rung(self) -> Rung {
        match self {
            QuestionType::CausalityIdentification | QuestionType::CausalAttribution => Rung::Discovery,
            QuestionType::IndividualCausalEffect => Rung::Intervention,
            QuestionType::CounterfactualReasoning
            | QuestionType::SufficientCause
            | QuestionType::NecessaryCause
            | QuestionType::ActualCause
            | QuestionType::Responsibility => Rung::Counterfactual,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::CausalityIdentification => "causality_identification",
            QuestionType::CausalAttribution => "causal_attribution",
            QuestionType::IndividualCausalEffect => "individual_causal_effect",
            QuestionType::CounterfactualReasoning => "counterfactual_reasoning",
            QuestionType::SufficientCause => "sufficient_cause",
            QuestionType::NecessaryCause => "necessary_cause",
            QuestionType::ActualCause => "actual_cause",
            QuestionType::Responsibility => "responsibility",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    YesNo,
    MultiChoice,
}

impl AnswerType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerType::YesNo => "yes_no",
            AnswerType::MultiChoice => "multi_choice",
        }
    }
}

/// Formal definitions of actual causation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CausalSemantics {
    /// Halpern-Pearl
    HP,
    BV,
    DBV,
    Boc,
}

impl CausalSemantics {
    pub const ALL: [CausalSemantics; 4] = [
        CausalSemantics::HP,
        CausalSemantics::BV,
        CausalSemantics::DBV,
        CausalSemantics::Boc,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YesNo {
    Yes,
    No,
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Binary(YesNo),
    /// Sorted indices into the shuffled options
    Indices(Vec<usize>),
    BySemantics(BTreeMap<CausalSemantics, Vec<usize>>),
}

/// One synthesized question with its verifiable answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: Answer,
    pub question_type: QuestionType,
    pub question_rung: Rung,
    pub answer_type: AnswerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl QaPair {
    /// Option texts selected by `indices`, skipping out-of-range entries
    pub fn selected(&self, indices: &[usize]) -> Vec<&str> {
        let Some(options) = &self.options else {
            return Vec::new();
        };
        indices
            .iter()
            .filter_map(|&i| options.get(i).map(String::as_str))
            .collect()
    }
}
