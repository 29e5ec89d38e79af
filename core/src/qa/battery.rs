//! Question battery construction
//!
//! Choice questions are shuffled by permuting option positions, so the
//! answer indices are derived from where each correct option landed rather
//! than from string lookups. Distractor options are inserted before the
//! final option of every choice list.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{Answer, AnswerType, CausalSemantics, QaPair, QuestionType, YesNo};

/// Shuffle `options` and return the shuffled list with the sorted positions
/// that the options at `correct` moved to
pub fn shuffle_options(
    options: Vec<String>,
    correct: &[usize],
    rng: &mut dyn RngCore,
) -> (Vec<String>, Vec<usize>) {
    let mut order: Vec<usize> = (0..options.len()).collect();
    order.shuffle(rng);

    let mut answer: Vec<usize> = order
        .iter()
        .enumerate()
        .filter(|(_, original)| correct.contains(original))
        .map(|(position, _)| position)
        .collect();
    answer.sort_unstable();

    let mut slots: Vec<Option<String>> = options.into_iter().map(Some).collect();
    let shuffled = order
        .iter()
        .filter_map(|&original| slots[original].take())
        .collect();

    (shuffled, answer)
}

/// Insert one line per distractor before the last option
fn insert_before_last(mut options: Vec<String>, extra: impl Iterator<Item = String>) -> (Vec<String>, usize) {
    let anchor = options.len().saturating_sub(1);
    let added: Vec<String> = extra.collect();
    let shift = added.len();
    options.splice(anchor..anchor, added);
    (options, shift)
}

/// Map an index into the base list onto the extended list
fn remap(index: usize, base_len: usize, shift: usize) -> usize {
    if index + 1 == base_len {
        index + shift
    } else {
        index
    }
}

/// Ordered question battery for one scene
///
/// Distractor descriptions are fixed at construction; pass an empty list
/// for scenes without distractors.
pub struct QaBattery<'r> {
    pairs: Vec<QaPair>,
    distractors: Vec<String>,
    rng: &'r mut dyn RngCore,
}

impl<'r> QaBattery<'r> {
    pub fn new(distractors: Vec<String>, rng: &'r mut dyn RngCore) -> Self {
        Self {
            pairs: Vec::new(),
            distractors,
            rng,
        }
    }

    pub fn yes_no(&mut self, question_type: QuestionType, question: String, answer: bool) -> &mut Self {
        self.pairs.push(QaPair {
            question,
            answer: Answer::Binary(YesNo::from(answer)),
            question_type,
            question_rung: question_type.rung(),
            answer_type: AnswerType::YesNo,
            options: None,
        });
        self
    }

    /// "Why did ...?" question; `correct` indexes the base `options`
    pub fn attribution(&mut self, question: String, options: Vec<String>, correct: &[usize]) -> &mut Self {
        let base_len = options.len();
        let lines = self
            .distractors
            .iter()
            .map(|d| format!("Because the {} was present.", d))
            .collect::<Vec<_>>();
        let (options, shift) = insert_before_last(options, lines.into_iter());
        let correct: Vec<usize> = correct.iter().map(|&i| remap(i, base_len, shift)).collect();

        let (shuffled, answer) = shuffle_options(options, &correct, &mut *self.rng);
        self.pairs.push(QaPair {
            question,
            answer: Answer::Indices(answer),
            question_type: QuestionType::CausalAttribution,
            question_rung: QuestionType::CausalAttribution.rung(),
            answer_type: AnswerType::MultiChoice,
            options: Some(shuffled),
        });
        self
    }

    /// Actual-cause question answered under every semantics from one shuffle
    pub fn actual_cause(
        &mut self,
        question: String,
        options: Vec<String>,
        key: [(CausalSemantics, &[usize]); 4],
    ) -> &mut Self {
        let base_len = options.len();
        let lines = self
            .distractors
            .iter()
            .map(|d| format!("The {} is present.", d))
            .collect::<Vec<_>>();
        let (options, shift) = insert_before_last(options, lines.into_iter());

        let mut order: Vec<usize> = (0..options.len()).collect();
        order.shuffle(&mut *self.rng);

        let mut answer = BTreeMap::new();
        for (semantics, correct) in key {
            let correct: Vec<usize> = correct.iter().map(|&i| remap(i, base_len, shift)).collect();
            let mut indices: Vec<usize> = order
                .iter()
                .enumerate()
                .filter(|(_, original)| correct.contains(original))
                .map(|(position, _)| position)
                .collect();
            indices.sort_unstable();
            answer.insert(semantics, indices);
        }

        let shuffled = order.iter().map(|&original| options[original].clone()).collect();
        self.pairs.push(QaPair {
            question,
            answer: Answer::BySemantics(answer),
            question_type: QuestionType::ActualCause,
            question_rung: QuestionType::ActualCause.rung(),
            answer_type: AnswerType::MultiChoice,
            options: Some(shuffled),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn finish(self) -> Vec<QaPair> {
        self.pairs
    }
}
