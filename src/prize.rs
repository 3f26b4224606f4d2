//! Prizes awarded on the final score

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::constants::prize;

/// A prize tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prize {
    /// Top tier
    TripToSwitzerland,
    /// Second tier
    OneMillion,
    /// Third tier
    EightyThousand,
    /// Fourth tier
    FiftyThousand,
}

impl Prize {
    /// The prize earned by a final `score`, if any
    ///
    /// Tiers are checked top down and the first match wins, so a score of
    /// exactly 25 lands on eighty thousand while 26 to 30 earn the million.
    pub fn for_score(score: u32) -> Option<Self> {
        if score >= prize::TRIP {
            Some(Self::TripToSwitzerland)
        } else if score > prize::MILLION_ABOVE {
            Some(Self::OneMillion)
        } else if score >= prize::EIGHTY_THOUSAND {
            Some(Self::EightyThousand)
        } else if score >= prize::FIFTY_THOUSAND {
            Some(Self::FiftyThousand)
        } else {
            None
        }
    }
}

impl Display for Prize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TripToSwitzerland => write!(f, "Trip to Switzerland (3 nights 4 days)"),
            Self::OneMillion => write!(f, "$1,000,000"),
            Self::EightyThousand => write!(f, "$80,000"),
            Self::FiftyThousand => write!(f, "$50,000"),
        }
    }
}
