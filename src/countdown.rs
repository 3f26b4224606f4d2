//! Per-question countdown
//!
//! The countdown is driven entirely by ticks delivered from outside; it
//! keeps no clock of its own.

/// Result of delivering one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is stopped and the tick was ignored
    Idle,
    /// Seconds left after the tick
    Running(u32),
    /// The tick brought the countdown to zero; it is now stopped
    Expired,
}

/// Integer-second countdown for the active question
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    /// Restarts the countdown from `seconds`
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.running = true;
    }

    /// Stops the countdown and clears the remaining time
    pub fn stop(&mut self) {
        self.remaining = 0;
        self.running = false;
    }

    /// Seconds left on the clock
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Whether ticks are currently counted
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Counts down one second
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }
}
