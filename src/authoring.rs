//! Question authoring
//!
//! Administrators submit questions as a [`QuestionDraft`]: a prompt, a
//! difficulty, and a fixed number of options with exactly one marked
//! correct. A draft that passes validation becomes a [`Question`] whose
//! round follows its difficulty.

use garde::Validate;
use itertools::Itertools;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{constants, question::Question};

type ValidationResult = garde::Result;

/// How hard a question is, which decides the round it is played in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Played in round 1
    #[default]
    Easy,
    /// Played in round 2
    Medium,
    /// Played in round 3
    Hard,
}

impl Difficulty {
    /// Round number, starting at 1
    pub fn round(self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }
}

/// One option of a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DraftOption {
    #[garde(length(min = 1, max = constants::question::MAX_OPTION_LENGTH))]
    text: String,
    #[garde(skip)]
    is_correct: bool,
}

impl DraftOption {
    /// Creates an option
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }

    /// Option text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this is the correct option
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

#[allow(clippy::ptr_arg)]
fn unique_texts(options: &Vec<DraftOption>, _ctx: &()) -> ValidationResult {
    if options.iter().map(DraftOption::text).all_unique() {
        Ok(())
    } else {
        Err(garde::Error::new("options must be unique"))
    }
}

/// A question as submitted by an administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QuestionDraft {
    /// The question text
    #[garde(length(min = 1, max = constants::question::MAX_PROMPT_LENGTH))]
    text: String,
    /// Decides the round the question is played in
    #[garde(skip)]
    difficulty: Difficulty,
    /// Answer options in display order
    #[garde(
        length(min = constants::authoring::OPTION_COUNT, max = constants::authoring::OPTION_COUNT),
        dive,
        custom(unique_texts)
    )]
    options: Vec<DraftOption>,
}

/// Reasons a draft is refused
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The draft failed validation
    #[error("invalid draft: {0}")]
    Invalid(String),
    /// The draft does not mark exactly one option as correct
    #[error("exactly one option must be correct, found {0}")]
    CorrectCount(usize),
    /// The text or an option contains inappropriate language
    #[error("draft contains inappropriate content")]
    Inappropriate,
}

impl QuestionDraft {
    /// Creates a draft; it is checked by [`QuestionDraft::into_question`]
    pub fn new(
        text: impl Into<String>,
        difficulty: Difficulty,
        options: Vec<DraftOption>,
    ) -> Self {
        Self {
            text: text.into(),
            difficulty,
            options,
        }
    }

    /// The question text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Difficulty of the question
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Options in display order
    pub fn options(&self) -> &[DraftOption] {
        &self.options
    }

    /// Checks the draft without consuming it
    ///
    /// # Errors
    ///
    /// * `Error::Invalid` - Text or options are empty, too long, duplicated,
    ///   or not exactly four
    /// * `Error::CorrectCount` - Not exactly one option is marked correct
    /// * `Error::Inappropriate` - Text or an option fails the profanity filter
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|report| Error::Invalid(report.to_string()))?;

        let correct = self.options.iter().filter(|o| o.is_correct).count();
        if correct != 1 {
            return Err(Error::CorrectCount(correct));
        }

        let inappropriate = self.text.is_inappropriate()
            || self.options.iter().any(|o| o.text.is_inappropriate());
        if inappropriate {
            return Err(Error::Inappropriate);
        }
        Ok(())
    }

    /// Turns the draft into a playable question
    ///
    /// Text and options are trimmed of surrounding whitespace before they are
    /// checked.
    ///
    /// # Errors
    ///
    /// See [`QuestionDraft::check`].
    pub fn into_question(
        mut self,
        id: u32,
        category: impl Into<String>,
    ) -> Result<Question, Error> {
        self.text = rustrict::trim_whitespace(&self.text).to_owned();
        for option in &mut self.options {
            option.text = rustrict::trim_whitespace(&option.text).to_owned();
        }

        if let Err(e) = self.check() {
            tracing::warn!(error = %e, "question draft refused");
            return Err(e);
        }

        let round = self.difficulty.round();
        let correct = self
            .options
            .iter()
            .find(|o| o.is_correct)
            .map(|o| o.text.clone())
            .unwrap_or_default();
        let options = self.options.into_iter().map(|o| o.text).collect_vec();

        let question = Question::new(id, self.text, options, correct, category, round);
        if let Err(report) = question.validate() {
            tracing::warn!(id, %report, "authored question refused");
            return Err(Error::Invalid(report.to_string()));
        }

        tracing::info!(id, round, "question authored");
        Ok(question)
    }
}
