//! Finished game results and where they are kept

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use web_time::SystemTime;

use crate::prize::Prize;

/// The archived outcome of a finished game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    id: Uuid,
    player: String,
    score: u32,
    prize: Option<Prize>,
    recorded_at: SystemTime,
}

impl GameResult {
    /// Creates a result stamped with a fresh id and the current time
    pub fn new(player: impl Into<String>, score: u32, prize: Option<Prize>) -> Self {
        Self {
            id: Uuid::new_v4(),
            player: player.into(),
            score,
            prize,
            recorded_at: SystemTime::now(),
        }
    }

    /// Unique id of this result
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The player the result belongs to
    pub fn player(&self) -> &str {
        &self.player
    }

    /// Final score
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Prize won, if any
    pub fn prize(&self) -> Option<Prize> {
        self.prize
    }

    /// Display label of the prize, as stored alongside the score
    pub fn prize_label(&self) -> Option<String> {
        self.prize.map(|prize| prize.to_string())
    }

    /// When the result was produced
    pub fn recorded_at(&self) -> SystemTime {
        self.recorded_at
    }
}

/// Errors reported by a result store
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The store could not be reached
    #[error("result store is unavailable")]
    Unavailable,
    /// The store refused the result
    #[error("result rejected: {0}")]
    Rejected(String),
}

/// Destination for finished game results
pub trait ResultStore {
    /// Persists one result
    ///
    /// # Errors
    ///
    /// Returns an `Error` if the result could not be stored.
    fn save_result(&mut self, result: &GameResult) -> Result<(), Error>;
}

/// Keeps results in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    results: Vec<GameResult>,
}

impl MemoryStore {
    /// Results stored so far, oldest first
    pub fn results(&self) -> &[GameResult] {
        &self.results
    }

    /// Best score recorded for `player`
    pub fn best_score(&self, player: &str) -> Option<u32> {
        self.results
            .iter()
            .filter(|result| result.player == player)
            .map(GameResult::score)
            .max()
    }
}

impl ResultStore for MemoryStore {
    fn save_result(&mut self, result: &GameResult) -> Result<(), Error> {
        self.results.push(result.clone());
        Ok(())
    }
}
