//! Lifelines and their per-round availability
//!
//! Each round grants one use of every [`Lifeline`]. A [`LifelineBank`]
//! tracks which are still available; a lifeline once consumed stays consumed
//! for the rest of its round.

use std::fmt::Display;

use enum_map::{Enum, EnumMap, enum_map};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::question::Question;

/// An assistive action usable once per round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Enum)]
pub enum Lifeline {
    /// Pass on the current question without scoring it
    Skip,
    /// Hide all but the correct option and one incorrect option
    FiftyFifty,
    /// Earn an extra point on the next correct answer
    Bonus,
}

impl Display for Lifeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::FiftyFifty => write!(f, "50/50"),
            Self::Bonus => write!(f, "bonus"),
        }
    }
}

/// Availability of every lifeline within one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifelineBank {
    available: EnumMap<Lifeline, bool>,
}

impl Default for LifelineBank {
    /// A fresh bank with every lifeline available
    fn default() -> Self {
        Self {
            available: enum_map! { _ => true },
        }
    }
}

impl LifelineBank {
    /// Whether `lifeline` can still be used this round
    pub fn is_available(&self, lifeline: Lifeline) -> bool {
        self.available[lifeline]
    }

    /// Marks `lifeline` as used
    ///
    /// # Returns
    ///
    /// `true` if the lifeline was available and is now consumed, `false` if
    /// it had already been used
    pub fn consume(&mut self, lifeline: Lifeline) -> bool {
        std::mem::replace(&mut self.available[lifeline], false)
    }

    /// Lifelines still available, in declaration order
    pub fn remaining(&self) -> Vec<Lifeline> {
        self.available
            .iter()
            .filter(|(_, available)| **available)
            .map(|(lifeline, _)| lifeline)
            .collect_vec()
    }
}

/// Source of randomness for lifelines
///
/// Hosts and tests may supply their own generator.
pub trait RandomSource {
    /// Returns an index in `0..len`; `len` is never zero
    fn index(&mut self, len: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn index(&mut self, len: usize) -> usize {
        self.usize(..len)
    }
}

/// Picks the options that stay visible after a 50/50
///
/// The correct option is always kept together with one incorrect option
/// chosen by `rng`. Options are returned in the question's display order.
pub fn fifty_fifty<R: RandomSource + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let wrong = question
        .options()
        .iter()
        .filter(|option| !question.is_correct(option))
        .collect_vec();

    let kept = if wrong.is_empty() {
        None
    } else {
        wrong.get(rng.index(wrong.len())).copied()
    };

    question
        .options()
        .iter()
        .filter(|option| question.is_correct(option) || Some(*option) == kept)
        .cloned()
        .collect_vec()
}
