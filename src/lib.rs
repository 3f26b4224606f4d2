//! # Quiz Contest Core
//!
//! This library provides the session engine for a three-round trivia
//! contest. A [`game::Game`] drives a single player through timed questions,
//! applies lifelines, keeps score, enforces disqualification and round gates,
//! and finally awards a prize. Everything outside the engine (notifications,
//! timer scheduling, result persistence) is reached through the
//! [`session::Host`] trait.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};

pub mod answer;
pub mod authoring;
pub mod config;
pub mod constants;
pub mod countdown;
pub mod game;
pub mod lifeline;
pub mod prize;
pub mod question;
pub mod result;
pub mod session;

/// Alarm messages for timed events
///
/// The engine asks its host to deliver these after a delay and receives
/// them back through [`game::Game::receive_alarm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One second has passed on the countdown of a question
    Tick {
        /// Zero-based round of the question
        round: usize,
        /// Zero-based index of the question within its round
        index: usize,
    },
}
