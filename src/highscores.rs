//! High score leaderboard system
//!
//! One top-10 board per game, persisted to LocalStorage.

use serde::{Deserialize, Serialize};

use crate::sim::{GameKind, Outcome};

/// Maximum number of high scores kept per game
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub game: GameKind,
    /// Player's score
    pub score: u64,
    /// How the session ended
    pub outcome: Outcome,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// High score leaderboards for every game
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    /// Sorted descending by score within each game
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_highscores";

    /// Create empty leaderboards
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries for one game, best first
    pub fn for_game(&self, game: GameKind) -> impl Iterator<Item = &HighScoreEntry> {
        self.entries.iter().filter(move |e| e.game == game)
    }

    /// Check if a score qualifies for the game's leaderboard
    pub fn qualifies(&self, game: GameKind, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        let board: Vec<_> = self.for_game(game).collect();
        if board.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        board.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the game's leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(
        &mut self,
        game: GameKind,
        score: u64,
        outcome: Outcome,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(game, score) {
            return None;
        }

        let rank = self.for_game(game).take_while(|e| e.score >= score).count() + 1;
        let entry = HighScoreEntry {
            game,
            score,
            outcome,
            timestamp,
        };

        // Insert after every entry (of any game) that outranks it
        let pos = self
            .entries
            .iter()
            .position(|e| e.game == game && score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);

        // Trim this game's board to max size
        let mut kept = 0;
        self.entries.retain(|e| {
            if e.game != game {
                return true;
            }
            kept += 1;
            kept <= MAX_HIGH_SCORES
        });

        Some(rank)
    }

    /// Get the top score for a game (if any)
    pub fn top_score(&self, game: GameKind) -> Option<u64> {
        self.for_game(game).next().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(scores) = serde_json::from_str::<HighScores>(&json) {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    return scores;
                }
            }
        }

        log::info!("No high scores found, starting fresh");
        Self::new()
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High scores saved ({} entries)", self.entries.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Current wall-clock time in ms, for entry timestamps
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(GameKind::Maze, 0));
        assert!(scores.qualifies(GameKind::Maze, 1));
    }

    #[test]
    fn test_ranks_descending() {
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(GameKind::Snake, 50, Outcome::GameOver, 0.0), Some(1));
        assert_eq!(scores.add_score(GameKind::Snake, 80, Outcome::GameOver, 1.0), Some(1));
        assert_eq!(scores.add_score(GameKind::Snake, 60, Outcome::Victory, 2.0), Some(2));
        let board: Vec<u64> = scores.for_game(GameKind::Snake).map(|e| e.score).collect();
        assert_eq!(board, vec![80, 60, 50]);
    }

    #[test]
    fn test_boards_are_per_game() {
        let mut scores = HighScores::new();
        scores.add_score(GameKind::Snake, 500, Outcome::GameOver, 0.0);
        assert_eq!(scores.add_score(GameKind::Maze, 10, Outcome::Victory, 0.0), Some(1));
        assert_eq!(scores.top_score(GameKind::Maze), Some(10));
        assert_eq!(scores.top_score(GameKind::Snake), Some(500));
        assert_eq!(scores.top_score(GameKind::Platformer), None);
    }

    #[test]
    fn test_board_truncates() {
        let mut scores = HighScores::new();
        for i in 1..=(MAX_HIGH_SCORES as u64 + 3) {
            scores.add_score(GameKind::Maze, i * 10, Outcome::GameOver, 0.0);
        }
        scores.add_score(GameKind::Snake, 5, Outcome::GameOver, 0.0);
        assert_eq!(scores.for_game(GameKind::Maze).count(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(GameKind::Maze, 10));
        assert_eq!(scores.for_game(GameKind::Snake).count(), 1);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut scores = HighScores::new();
        scores.add_score(GameKind::Platformer, 120, Outcome::Victory, 42.0);
        let json = serde_json::to_string(&scores).unwrap();
        let back: HighScores = serde_json::from_str(&json).unwrap();
        assert_eq!(back.entries, scores.entries);
    }
}
