//! Contest rules
//!
//! [`Rules`] gathers the tunable parts of a contest: how long each question
//! may run, how many wrong answers in a row end the game, and the score gates
//! between rounds. Defaults reproduce the standard contest.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::constants;

type ValidationResult = garde::Result;

/// Validates that a duration falls within specified bounds.
///
/// # Errors
///
/// Returns a `garde::Error` if the duration is outside the specified bounds.
fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    field: &'static str,
    val: &Duration,
) -> ValidationResult {
    if (MIN_SECONDS..=MAX_SECONDS).contains(&val.as_secs()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_SECONDS},{MAX_SECONDS}]",
        )))
    }
}

fn validate_time_limit(val: &Duration) -> ValidationResult {
    validate_duration::<
        { constants::game::MIN_TIME_LIMIT },
        { constants::game::MAX_TIME_LIMIT },
    >("time_limit", val)
}

/// Minimum cumulative score required to leave a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundGate {
    /// Score must be at least this value
    AtLeast(u32),
    /// Score must be strictly greater than this value
    Above(u32),
}

impl RoundGate {
    /// Whether `score` lets the player through this gate
    pub fn admits(self, score: u32) -> bool {
        match self {
            Self::AtLeast(min) => score >= min,
            Self::Above(threshold) => score > threshold,
        }
    }

    /// The smallest score that passes the gate
    pub fn required(self) -> u32 {
        match self {
            Self::AtLeast(min) => min,
            Self::Above(threshold) => threshold.saturating_add(1),
        }
    }

    /// Whether any score can pass the gate
    pub fn is_passable(self) -> bool {
        match self {
            Self::AtLeast(_) => true,
            Self::Above(threshold) => threshold < u32::MAX,
        }
    }
}

fn validate_gates(
    gates: &[RoundGate; constants::game::ROUND_COUNT - 1],
    _ctx: &(),
) -> ValidationResult {
    match gates.iter().position(|gate| !gate.is_passable()) {
        None => Ok(()),
        Some(round) => Err(garde::Error::new(format!(
            "gate after round {} can never be passed",
            round + 1
        ))),
    }
}

/// Tunable rules for a contest
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Rules {
    /// Time a player has to answer each question
    #[garde(custom(|v, _| validate_time_limit(v)))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    time_limit: Duration,
    /// Wrong answers or timeouts in a row that disqualify the player
    #[garde(range(min = 1, max = constants::game::MAX_CONSECUTIVE_WRONG_LIMIT))]
    consecutive_wrong_limit: u32,
    /// Gates after the first and second round; the last round has none
    #[garde(custom(validate_gates))]
    gates: [RoundGate; constants::game::ROUND_COUNT - 1],
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(constants::game::TIME_LIMIT_SECONDS),
            consecutive_wrong_limit: constants::game::CONSECUTIVE_WRONG_LIMIT,
            gates: [
                RoundGate::AtLeast(constants::game::ROUND_ONE_PASS),
                RoundGate::Above(constants::game::ROUND_TWO_THRESHOLD),
            ],
        }
    }
}

impl Rules {
    /// Builds rules from explicit values; call `validate` before use
    pub fn new(
        time_limit: Duration,
        consecutive_wrong_limit: u32,
        gates: [RoundGate; constants::game::ROUND_COUNT - 1],
    ) -> Self {
        Self {
            time_limit,
            consecutive_wrong_limit,
            gates,
        }
    }

    /// Whole seconds a question may run
    pub fn time_limit_seconds(&self) -> u32 {
        self.time_limit.as_secs() as u32
    }

    /// Wrong answers in a row that disqualify the player
    pub fn consecutive_wrong_limit(&self) -> u32 {
        self.consecutive_wrong_limit
    }

    /// Gate guarding the exit of `round`, or `None` for the final round
    pub fn gate_after(&self, round: usize) -> Option<RoundGate> {
        self.gates.get(round).copied()
    }
}
