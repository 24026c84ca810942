use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_SPEED_LEVEL, POINTS_PER_SPEED_LEVEL, is_valid_speed_level};

/// Score, timing and run flags of the current session.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub score: u32,
    pub elapsed_seconds: u64,
    pub speed_level: u32,
    pub active: bool,
    pub paused: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::idle(DEFAULT_SPEED_LEVEL)
    }
}

impl Session {
    /// An inactive session that keeps the chosen speed.
    #[must_use]
    pub fn idle(speed_level: u32) -> Self {
        Self {
            score: 0,
            elapsed_seconds: 0,
            speed_level,
            active: false,
            paused: false,
        }
    }

    /// A freshly started, running session.
    #[must_use]
    pub fn started(speed_level: u32) -> Self {
        Self {
            active: true,
            ..Self::idle(speed_level)
        }
    }

    /// True while ticks and the elapsed-time counter should advance.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active && !self.paused
    }

    /// Points granted for one food item at the current speed.
    #[must_use]
    pub fn food_points(&self) -> u32 {
        POINTS_PER_SPEED_LEVEL * self.speed_level
    }

    /// Adds the food reward and returns the new score.
    pub fn award_food(&mut self) -> u32 {
        self.score = self.score.saturating_add(self.food_points());
        self.score
    }

    /// Sets the speed level; out-of-range levels are ignored.
    pub fn set_speed_level(&mut self, level: u32) -> bool {
        if !is_valid_speed_level(level) {
            return false;
        }
        self.speed_level = level;
        true
    }
}

/// Formats seconds as zero-padded `mm:ss`.
#[must_use]
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
