//! Contracts with the surrounding app
//!
//! The arcade only talks to the outside world through [`ArcadeHost`]: it
//! reads the player's avatar, spends the play cost once per session start,
//! and reports the final result. Everything else (task tracking, the shop,
//! stats pages) lives behind this trait.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::highscores::{self, HighScores};
use crate::sim::{GameKind, Outcome};

/// Cosmetic avatar chosen by the player in the host app
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvatarId(String);

impl AvatarId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AvatarId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AvatarId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for AvatarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final result of one session, reported on the terminal transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub game: GameKind,
    pub score: u64,
    pub outcome: Outcome,
}

/// Capabilities the arcade needs from its host
pub trait ArcadeHost {
    /// Avatar used to pick the obstacle palette; `None` uses the default
    fn player_avatar(&self) -> Option<AvatarId>;

    /// Try to pay for a session. `false` blocks the start.
    fn spend_play_cost(&mut self, amount: u32) -> bool;

    /// Fire-and-forget notification when a session ends
    fn report_session_result(&mut self, result: SessionResult);
}

/// Token balance that pays for sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenWallet {
    pub balance: u32,
    /// Sessions cost nothing (testing switch)
    pub free_play: bool,
}

impl TokenWallet {
    pub fn new(balance: u32) -> Self {
        Self {
            balance,
            free_play: false,
        }
    }

    pub fn free_play() -> Self {
        Self {
            balance: 0,
            free_play: true,
        }
    }

    /// Deduct `amount` if affordable
    pub fn spend(&mut self, amount: u32) -> bool {
        if self.free_play {
            return true;
        }
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                true
            }
            None => false,
        }
    }
}

/// Standalone host: in-memory wallet, persisted high scores
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    pub avatar: Option<AvatarId>,
    pub wallet: TokenWallet,
    pub high_scores: HighScores,
    /// Every result reported so far this run
    pub results: Vec<SessionResult>,
}

impl LocalHost {
    pub fn new(avatar: Option<AvatarId>, wallet: TokenWallet) -> Self {
        Self {
            avatar,
            wallet,
            high_scores: HighScores::load(),
            results: Vec::new(),
        }
    }
}

impl ArcadeHost for LocalHost {
    fn player_avatar(&self) -> Option<AvatarId> {
        self.avatar.clone()
    }

    fn spend_play_cost(&mut self, amount: u32) -> bool {
        self.wallet.spend(amount)
    }

    fn report_session_result(&mut self, result: SessionResult) {
        self.results.push(result);
        if let Some(rank) = self.high_scores.add_score(
            result.game,
            result.score,
            result.outcome,
            highscores::now_ms(),
        ) {
            log::info!("New {} high score #{}: {}", result.game.as_str(), rank, result.score);
            self.high_scores.save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_spend() {
        let mut wallet = TokenWallet::new(2);
        assert!(wallet.spend(1));
        assert!(wallet.spend(1));
        assert!(!wallet.spend(1));
        assert_eq!(wallet.balance, 0);
    }

    #[test]
    fn test_free_play_never_blocks() {
        let mut wallet = TokenWallet::free_play();
        assert!(wallet.spend(100));
        assert_eq!(wallet.balance, 0);
    }

    #[test]
    fn test_local_host_records_results() {
        let mut host = LocalHost::new(Some("cat".into()), TokenWallet::new(1));
        host.report_session_result(SessionResult {
            game: GameKind::Maze,
            score: 40,
            outcome: Outcome::Victory,
        });
        assert_eq!(host.results.len(), 1);
        assert_eq!(host.high_scores.top_score(GameKind::Maze), Some(40));
    }
}
