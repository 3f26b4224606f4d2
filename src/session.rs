//! Host integration
//!
//! This module defines the trait through which the engine reaches the world
//! around it, and the notices it emits. A host might forward notices over a
//! WebSocket, drive alarms from an async timer, and persist results in a
//! database; the engine does not care which.

use std::time::Duration;

use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::{
    AlarmMessage,
    game::{Disqualification, Error},
    prize::Prize,
    result::{self, GameResult},
};

/// Advisory messages emitted by the engine
///
/// Notices are fire-and-forget; the engine never reads them back.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::From)]
pub enum Notice {
    /// A question became active
    QuestionStarted {
        /// Zero-based round
        round: usize,
        /// Zero-based index within the round
        index: usize,
        /// Number of questions in the round
        count: usize,
        /// Seconds on the clock, or `None` if the question is already answered
        seconds: Option<u32>,
    },
    /// Correct answer
    Correct {
        /// Points gained
        points: u32,
    },
    /// Correct answer with the bonus point applied
    BonusAwarded {
        /// Points gained, bonus included
        points: u32,
    },
    /// The bonus was requested but has already been used this round
    BonusUnavailable,
    /// Wrong answer
    Wrong,
    /// The countdown ran out
    TimedOut,
    /// The question was skipped
    Skipped,
    /// 50/50 applied; only these options remain
    FiftyFiftyApplied {
        /// Remaining options in display order
        remaining: Vec<String>,
    },
    /// The next correct answer this round earns the bonus
    BonusArmed,
    /// An operation was refused; nothing changed
    #[from]
    Rejected(Error),
    /// The game ended by disqualification
    #[from]
    Disqualified(Disqualification),
    /// A round gate was passed
    RoundCleared {
        /// Zero-based round that was cleared
        round: usize,
        /// Cumulative score
        score: u32,
    },
    /// A round gate was not met and the game is over
    RoundFailed {
        /// Zero-based round that was failed
        round: usize,
        /// Cumulative score
        score: u32,
        /// Score that would have passed
        required: u32,
    },
    /// The final round is complete
    Finished {
        /// Final score
        score: u32,
        /// Prize won, if any
        prize: Option<Prize>,
    },
    /// The finished result could not be persisted
    #[from]
    ResultNotSaved(result::Error),
}

impl Notice {
    /// Converts the notice to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The environment a game runs in
///
/// Implementations deliver notices to the player, schedule alarms, and store
/// finished results. Every method is called synchronously from within an
/// engine operation.
pub trait Host {
    /// Delivers a notice to the player
    fn send_notice(&mut self, notice: &Notice);

    /// Asks for `alarm` to be handed back to the engine after `after`
    fn schedule_alarm(&mut self, alarm: AlarmMessage, after: Duration);

    /// Withdraws a previously scheduled alarm
    ///
    /// Alarms that still arrive after cancellation are ignored by the engine.
    fn cancel_alarm(&mut self, alarm: AlarmMessage);

    /// Persists the result of a finished game
    ///
    /// # Errors
    ///
    /// Returns a `result::Error` if the result could not be stored; the game
    /// still finishes.
    fn save_result(&mut self, result: &GameResult) -> Result<(), result::Error>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::lifeline::Lifeline;

    #[test]
    fn test_notice_to_message() {
        let json = Notice::RoundCleared { round: 0, score: 7 }.to_message();
        assert!(json.contains("RoundCleared"));
        assert!(json.contains("\"score\":7"));
    }

    #[test]
    fn test_rejected_notice_carries_error() {
        let json = Notice::Rejected(Error::LifelineUsed(Lifeline::Skip)).to_message();
        assert!(json.contains("Rejected"));
        assert!(json.contains("LifelineUsed"));
        assert!(json.contains("Skip"));
    }

    #[test]
    fn test_finished_without_prize_omits_field() {
        let json = Notice::Finished {
            score: 12,
            prize: None,
        }
        .to_message();
        assert!(!json.contains("prize"));
    }

    #[test]
    fn test_notice_from_outcomes() {
        assert_eq!(
            Notice::from(Error::AlreadyAnswered),
            Notice::Rejected(Error::AlreadyAnswered)
        );
        assert_eq!(
            Notice::from(Disqualification::Abandoned),
            Notice::Disqualified(Disqualification::Abandoned)
        );
        assert_eq!(
            Notice::from(result::Error::Unavailable),
            Notice::ResultNotSaved(result::Error::Unavailable)
        );
    }
}
