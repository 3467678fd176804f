//! Arcade settings and game balance
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Lives at session start
    pub fn starting_lives(&self) -> u8 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => STARTING_LIVES,
            Difficulty::Hard => 1,
        }
    }

    /// Grace window after losing a life (ms)
    pub fn hit_invulnerability_ms(&self) -> u64 {
        match self {
            Difficulty::Easy => 3_000,
            Difficulty::Normal => HIT_INVULNERABILITY_MS,
            Difficulty::Hard => 1_000,
        }
    }

    /// Enemies step once every N maze ticks
    pub fn maze_enemy_every(&self) -> u32 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => MAZE_ENEMY_EVERY,
            Difficulty::Hard => 1,
        }
    }

    /// Snake tick period (ms); lower is faster
    pub fn snake_tick_ms(&self) -> u32 {
        match self {
            Difficulty::Easy => 160,
            Difficulty::Normal => SNAKE_TICK_MS,
            Difficulty::Hard => 80,
        }
    }
}

/// Arcade settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeSettings {
    /// Balance preset
    pub difficulty: Difficulty,

    // === Session ===
    /// Tokens spent to start a session
    pub play_cost: u32,
    pub starting_lives: u8,
    /// Invulnerability after a hit (ms)
    pub hit_invulnerability_ms: u64,
    /// Invulnerability from a power collectible (ms)
    pub power_duration_ms: u64,

    // === Timing ===
    pub snake_tick_ms: u32,
    pub maze_tick_ms: u32,
    pub maze_enemy_every: u32,

    // === Generation ===
    pub maze_width: i32,
    pub maze_height: i32,
    pub snake_width: i32,
    pub snake_height: i32,
    /// Chance each maze link is carved open
    pub open_probability: f64,
    /// Chance an open cell receives a collectible
    pub collectible_probability: f64,
    /// Share of collectibles that are power-ups
    pub power_probability: f64,
}

impl Default for ArcadeSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            play_cost: 1,
            starting_lives: STARTING_LIVES,
            hit_invulnerability_ms: HIT_INVULNERABILITY_MS,
            power_duration_ms: POWER_DURATION_MS,

            snake_tick_ms: SNAKE_TICK_MS,
            maze_tick_ms: MAZE_TICK_MS,
            maze_enemy_every: MAZE_ENEMY_EVERY,

            maze_width: MAZE_WIDTH,
            maze_height: MAZE_HEIGHT,
            snake_width: SNAKE_WIDTH,
            snake_height: SNAKE_HEIGHT,
            open_probability: MAZE_OPEN_PROBABILITY,
            collectible_probability: COLLECTIBLE_PROBABILITY,
            power_probability: POWER_PROBABILITY,
        }
    }
}

impl ArcadeSettings {
    /// Create settings from a difficulty preset (applies preset defaults)
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(difficulty);
        settings
    }

    /// Apply a difficulty preset (updates difficulty-dependent settings)
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.starting_lives = difficulty.starting_lives();
        self.hit_invulnerability_ms = difficulty.hit_invulnerability_ms();
        self.maze_enemy_every = difficulty.maze_enemy_every();
        self.snake_tick_ms = difficulty.snake_tick_ms();
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        for d in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_normal_preset_matches_default() {
        assert_eq!(
            ArcadeSettings::from_preset(Difficulty::Normal),
            ArcadeSettings::default()
        );
    }

    #[test]
    fn test_hard_preset() {
        let s = ArcadeSettings::from_preset(Difficulty::Hard);
        assert_eq!(s.starting_lives, 1);
        assert_eq!(s.maze_enemy_every, 1);
        assert!(s.snake_tick_ms < SNAKE_TICK_MS);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = ArcadeSettings::from_json(r#"{"play_cost": 0, "maze_width": 31}"#).unwrap();
        assert_eq!(s.play_cost, 0);
        assert_eq!(s.maze_width, 31);
        assert_eq!(s.starting_lives, STARTING_LIVES);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(ArcadeSettings::from_json("{not json").is_err());
    }
}
