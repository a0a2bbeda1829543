//! Tuning constants, difficulty presets and environment settings.

use std::path::PathBuf;

pub const MIN_TIMEOUT_MS: u64 = 25;
pub const MAX_TIMEOUT_MS: u64 = 300;

pub const FLASH_INTERVAL_S: f64 = 0.15;
pub const NOTICE_DURATION_S: f64 = 2.0;
pub const ENEMY_NOTICE_DURATION_S: f64 = 1.5;

/// Multi-food spawn count decays by one every this many seconds.
pub const MULTI_FOOD_DECAY_S: f64 = 180.0;
pub const MULTI_FOOD_START_COUNT: u32 = 3;

pub const MAZE_FREEZE_S: u64 = 3;
pub const MAZE_SLOWDOWN_FACTOR: f64 = 3.0;
/// Largest share of the interior a maze may cover.
pub const MAZE_AREA_FRACTION: f64 = 0.20;
pub const MAZE_CORRIDOR_WIDTH: i32 = 3;
/// One maze food per this many free path cells.
pub const MAZE_FOOD_DENSITY: usize = 4;

pub const ENEMY_WOBBLE_CHANCE: f64 = 0.20;
pub const ENEMY_LONG_LENGTH: usize = 100;
/// Split offspring move once every this many ticks.
pub const ENEMY_SPLIT_CADENCE: u32 = 2;
pub const ENEMY_MAX_CADENCE: u32 = 8;
pub const ENEMY_DURATION_S: f64 = 30.0;

pub const PLACEMENT_ATTEMPTS: usize = 50;
pub const OBSTACLE_PLACEMENT_ATTEMPTS: usize = 100;

pub const MAX_PICKUPS: usize = 5;
pub const PICKUP_SPAWN_CHANCE: f64 = 0.8;
pub const PICKUP_SPAWN_MIN_S: f64 = 15.0;
pub const PICKUP_SPAWN_MAX_S: f64 = 45.0;

pub const SCORE_FOOD: u32 = 10;
pub const SCORE_MAZE_FOOD: u32 = 15;
pub const SCORE_POWERUP: u32 = 25;
pub const SCORE_ENEMY_HEAD: u32 = 100;
pub const SCORE_ENEMY_SPLIT: u32 = 50;
pub const PENALTY_BALL: u32 = 5;
pub const PENALTY_METEOR: u32 = 2;
pub const PENALTY_OBSTACLE_FAIL: u32 = 15;

pub const MIN_TERM_W: u16 = 40;
pub const MIN_TERM_H: u16 = 15;

pub const DEFAULT_HIGHSCORE_FILE: &str = "snake_highscore.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1" | "easy" => Some(Difficulty::Easy),
            "2" | "medium" | "med" => Some(Difficulty::Medium),
            "3" | "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Tick cadence at the start of a game, in milliseconds.
    pub fn base_timeout(self) -> u64 {
        match self {
            Difficulty::Easy => 150,
            Difficulty::Medium => 100,
            Difficulty::Hard => 70,
        }
    }

    /// Fraction of the timeout removed per regular food.
    pub fn speed_increase(self) -> f64 {
        match self {
            Difficulty::Easy => 0.02,
            Difficulty::Medium => 0.04,
            Difficulty::Hard => 0.07,
        }
    }

    /// Fraction of the timeout added by the multi-food slowdown.
    pub fn slowdown(self) -> f64 {
        match self {
            Difficulty::Easy => 0.60,
            Difficulty::Medium => 0.45,
            Difficulty::Hard => 0.30,
        }
    }

    pub fn maze_duration(self) -> f64 {
        match self {
            Difficulty::Easy => 30.0,
            Difficulty::Medium => 45.0,
            Difficulty::Hard => 60.0,
        }
    }
}

pub fn clamp_timeout(timeout: u64) -> u64 {
    timeout.clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS)
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub highscore_path: PathBuf,
}

pub fn read_settings() -> Settings {
    let difficulty = std::env::var("SNAKE_DIFFICULTY")
        .ok()
        .and_then(|v| Difficulty::from_str(&v))
        .unwrap_or_default();
    let highscore_path = std::env::var("SNAKE_HIGHSCORE_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HIGHSCORE_FILE));
    Settings {
        difficulty,
        highscore_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_keys_and_names() {
        assert_eq!(Difficulty::from_str("1"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str(" Hard "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("med"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn clamp_timeout_respects_bounds() {
        assert_eq!(clamp_timeout(0), MIN_TIMEOUT_MS);
        assert_eq!(clamp_timeout(10_000), MAX_TIMEOUT_MS);
        assert_eq!(clamp_timeout(120), 120);
    }
}
