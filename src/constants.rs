//! Configuration constants for the quiz contest
//!
//! This module contains the fixed limits and thresholds used throughout
//! the engine. Anything tunable per contest lives in [`crate::config`]
//! and takes its defaults from here.

/// Round and timing constants
pub mod game {
    /// Number of rounds in a contest
    pub const ROUND_COUNT: usize = 3;
    /// Default seconds a player has to answer a question
    pub const TIME_LIMIT_SECONDS: u64 = 30;
    /// Minimum configurable answer time in seconds
    pub const MIN_TIME_LIMIT: u64 = 5;
    /// Maximum configurable answer time in seconds
    pub const MAX_TIME_LIMIT: u64 = 240;
    /// Consecutive wrong answers (or timeouts) that disqualify a player
    pub const CONSECUTIVE_WRONG_LIMIT: u32 = 3;
    /// Upper bound for a configured consecutive wrong limit
    pub const MAX_CONSECUTIVE_WRONG_LIMIT: u32 = 10;
    /// Cumulative score needed to leave round 1 (inclusive)
    pub const ROUND_ONE_PASS: u32 = 6;
    /// Cumulative score that must be exceeded to leave round 2
    pub const ROUND_TWO_THRESHOLD: u32 = 15;
}

/// Points awarded per answer
pub mod points {
    /// Points for a correct answer
    pub const CORRECT: u32 = 1;
    /// Extra points when the bonus lifeline applies
    pub const BONUS: u32 = 1;
}

/// Prize thresholds on the final score
pub mod prize {
    /// Score at or above which the trip is awarded
    pub const TRIP: u32 = 31;
    /// Score strictly above which the million is awarded
    pub const MILLION_ABOVE: u32 = 25;
    /// Score at or above which eighty thousand is awarded
    pub const EIGHTY_THOUSAND: u32 = 25;
    /// Score at or above which fifty thousand is awarded
    pub const FIFTY_THOUSAND: u32 = 20;
}

/// Question content limits
pub mod question {
    /// Maximum length of a question prompt in characters
    pub const MAX_PROMPT_LENGTH: usize = 500;
    /// Minimum number of options per question
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of options per question
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of a single option
    pub const MAX_OPTION_LENGTH: usize = 200;
    /// Maximum length of a category label
    pub const MAX_CATEGORY_LENGTH: usize = 100;
    /// Highest round number a question may belong to
    pub const MAX_ROUND: u8 = 3;
}

/// Question authoring limits
pub mod authoring {
    /// Options an authored question must carry
    pub const OPTION_COUNT: usize = 4;
}
