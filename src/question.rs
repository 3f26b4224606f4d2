//! Questions and the rounds they are played in
//!
//! A contest is played over three rounds, each an ordered list of
//! [`Question`]s. Questions are loaded once per game through a
//! [`QuestionRepository`] and never change afterwards.

use std::collections::HashSet;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

type ValidationResult = garde::Result;

#[allow(clippy::ptr_arg)]
fn unique_options(options: &Vec<String>, _ctx: &()) -> ValidationResult {
    if options.iter().all_unique() {
        Ok(())
    } else {
        Err(garde::Error::new("options must be unique"))
    }
}

fn member_of(options: &[String]) -> impl FnOnce(&String, &()) -> ValidationResult + '_ {
    move |correct, _| {
        if options.contains(correct) {
            Ok(())
        } else {
            Err(garde::Error::new("answer is not one of the options"))
        }
    }
}

/// A single multiple choice question
///
/// The serialized field names follow the question bank format, where the
/// prompt is stored as `question` and the correct option as `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Identifier, unique within a round
    #[garde(skip)]
    id: u32,
    /// The text shown to the player
    #[serde(rename = "question")]
    #[garde(length(min = 1, max = constants::question::MAX_PROMPT_LENGTH))]
    prompt: String,
    /// Answer options in display order
    #[garde(
        length(min = constants::question::MIN_OPTION_COUNT, max = constants::question::MAX_OPTION_COUNT),
        inner(length(min = 1, max = constants::question::MAX_OPTION_LENGTH)),
        custom(unique_options)
    )]
    options: Vec<String>,
    /// The correct option, which must be one of `options`
    #[serde(rename = "answer")]
    #[garde(custom(member_of(&self.options)))]
    correct: String,
    /// Free-form category label
    #[garde(length(max = constants::question::MAX_CATEGORY_LENGTH))]
    category: String,
    /// Round number, starting at 1
    #[garde(range(min = 1, max = constants::question::MAX_ROUND))]
    round: u8,
}

impl Question {
    /// Creates a question; it is checked when its round set is built
    pub fn new(
        id: u32,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: impl Into<String>,
        category: impl Into<String>,
        round: u8,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            options,
            correct: correct.into(),
            category: category.into(),
            round,
        }
    }

    /// Identifier of the question
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The text shown to the player
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Options in display order
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// The correct option
    pub fn correct(&self) -> &str {
        &self.correct
    }

    /// Category label
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Round number, starting at 1
    pub fn round(&self) -> u8 {
        self.round
    }

    /// Whether `option` is the correct answer
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct == option
    }

    /// Whether `option` is one of the listed options
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}

/// Errors raised while loading questions
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A question failed validation
    #[error("question {id} is invalid: {report}")]
    Invalid {
        /// Identifier of the offending question
        id: u32,
        /// Validation report
        report: String,
    },
    /// A round has no questions
    #[error("round {0} has no questions")]
    EmptyRound(usize),
    /// Two questions in one round share an identifier
    #[error("round {round} contains question {id} more than once")]
    DuplicateId {
        /// Round number, starting at 1
        round: usize,
        /// Repeated identifier
        id: u32,
    },
    /// The question bank could not be parsed
    #[error("malformed question bank: {0}")]
    Malformed(String),
}

/// The questions of a contest grouped by round, in presentation order
#[derive(Debug, Clone, Serialize)]
pub struct RoundSet {
    rounds: [Vec<Question>; constants::game::ROUND_COUNT],
}

impl RoundSet {
    /// Validates `questions` and groups them by round, keeping their order
    ///
    /// # Errors
    ///
    /// * `Error::Invalid` - A question fails validation
    /// * `Error::DuplicateId` - An identifier repeats within a round
    /// * `Error::EmptyRound` - A round ends up with no questions
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Result<Self, Error> {
        let mut rounds: [Vec<Question>; constants::game::ROUND_COUNT] = Default::default();
        let mut seen = HashSet::new();

        for question in questions {
            question.validate().map_err(|report| Error::Invalid {
                id: question.id,
                report: report.to_string(),
            })?;

            if !seen.insert((question.round, question.id)) {
                return Err(Error::DuplicateId {
                    round: usize::from(question.round),
                    id: question.id,
                });
            }

            rounds[usize::from(question.round) - 1].push(question);
        }

        if let Some(empty) = rounds.iter().position(Vec::is_empty) {
            return Err(Error::EmptyRound(empty + 1));
        }

        Ok(Self { rounds })
    }

    /// Questions of the zero-based `round`
    pub fn round(&self, round: usize) -> Option<&[Question]> {
        self.rounds.get(round).map(Vec::as_slice)
    }

    /// A single question by zero-based round and index
    pub fn question(&self, round: usize, index: usize) -> Option<&Question> {
        self.rounds.get(round)?.get(index)
    }

    /// Number of questions in the zero-based `round`
    pub fn round_len(&self, round: usize) -> usize {
        self.rounds.get(round).map_or(0, Vec::len)
    }

    /// Total number of questions
    pub fn len(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    /// Whether the set holds no questions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of the questions for a game
pub trait QuestionRepository {
    /// Loads every round; called once when a game starts
    ///
    /// # Errors
    ///
    /// Returns an `Error` if the questions are missing or invalid.
    fn load_rounds(&self) -> Result<RoundSet, Error>;
}

/// Repository backed by a JSON array of questions
#[derive(Debug, Clone)]
pub struct JsonRepository {
    source: String,
}

impl JsonRepository {
    /// Wraps a JSON document holding an array of questions
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl QuestionRepository for JsonRepository {
    fn load_rounds(&self) -> Result<RoundSet, Error> {
        let questions: Vec<Question> =
            serde_json::from_str(&self.source).map_err(|e| Error::Malformed(e.to_string()))?;
        let rounds = RoundSet::new(questions)?;
        tracing::debug!(
            round_one = rounds.round_len(0),
            round_two = rounds.round_len(1),
            round_three = rounds.round_len(2),
            "loaded question bank"
        );
        Ok(rounds)
    }
}
