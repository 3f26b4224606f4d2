//! Recorded answers
//!
//! Every question is scored at most once. The [`AnswerSheet`] holds one
//! [`AnswerRecord`] per question and refuses to overwrite an existing one.

use std::collections::{HashMap, hash_map::Entry};

use serde::{Deserialize, Serialize};

/// Why an answer is being submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitReason {
    /// The player confirmed an option
    Normal,
    /// The player confirmed an option and asked for the bonus point
    Bonus,
    /// The player spent the skip lifeline
    Skip,
    /// The countdown ran out
    Timeout,
}

/// Identifies a question within a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerKey {
    /// Zero-based round
    pub round: usize,
    /// Question identifier within the round
    pub question_id: u32,
}

/// The outcome of a single question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    selected: Option<String>,
    is_correct: bool,
    points: u32,
    skipped: bool,
}

impl AnswerRecord {
    /// A confirmed option and the points it earned
    pub fn answered(selected: String, is_correct: bool, points: u32) -> Self {
        Self {
            selected: Some(selected),
            is_correct,
            points,
            skipped: false,
        }
    }

    /// The countdown expired without an answer
    pub fn timed_out() -> Self {
        Self {
            selected: None,
            is_correct: false,
            points: 0,
            skipped: false,
        }
    }

    /// The question was skipped
    pub fn skipped() -> Self {
        Self {
            selected: None,
            is_correct: false,
            points: 0,
            skipped: true,
        }
    }

    /// The option the player confirmed, if any
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Whether the confirmed option was correct
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    /// Points earned, bonus included
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Whether the question was skipped
    pub fn was_skipped(&self) -> bool {
        self.skipped
    }
}

/// All answers given in a game
#[derive(Debug, Default, Clone)]
pub struct AnswerSheet {
    records: HashMap<AnswerKey, AnswerRecord>,
}

impl AnswerSheet {
    /// The record for `key`, if the question has been answered
    pub fn get(&self, key: AnswerKey) -> Option<&AnswerRecord> {
        self.records.get(&key)
    }

    /// Whether the question identified by `key` has been answered
    pub fn is_submitted(&self, key: AnswerKey) -> bool {
        self.records.contains_key(&key)
    }

    /// Stores the record for a question that has not been answered yet
    ///
    /// # Returns
    ///
    /// The stored record, or `None` if the question already has one, in
    /// which case the existing record is left untouched
    pub fn record(&mut self, key: AnswerKey, record: AnswerRecord) -> Option<&AnswerRecord> {
        match self.records.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(v) => Some(v.insert(record)),
        }
    }

    /// Sum of points over all records
    pub fn total_points(&self) -> u32 {
        self.records.values().map(AnswerRecord::points).sum()
    }

    /// Number of answered questions in the zero-based `round`
    pub fn answered_in_round(&self, round: usize) -> usize {
        self.records.keys().filter(|key| key.round == round).count()
    }

    /// Number of recorded answers
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
