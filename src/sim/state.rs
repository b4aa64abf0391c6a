//! Game state: lives, score, level and phase
//!
//! Entity populations live in the world; this is the scoreboard the world updates as
//! things are inserted and destroyed.

use serde::{Deserialize, Serialize};

use crate::consts::STARTING_LIVES;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Active gameplay
    #[default]
    Playing,
    /// Clock stopped
    Paused,
    /// Out of lives
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Player lives
    pub lives: u32,
    /// Rocks and turrets still alive (queued ones included)
    pub targets: u32,
    /// Current level (1-based once a game starts)
    pub level: u32,
    pub score: u64,
    pub phase: GamePhase,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(STARTING_LIVES)
    }
}

impl GameState {
    pub fn new(lives: u32) -> Self {
        Self {
            lives,
            targets: 0,
            level: 0,
            score: 0,
            phase: GamePhase::Playing,
        }
    }

    /// Fresh game with `lives`
    pub fn reset(&mut self, lives: u32) {
        *self = Self::new(lives);
    }

    pub fn target_added(&mut self) {
        self.targets += 1;
    }

    pub fn target_destroyed(&mut self, score: u64) {
        self.targets = self.targets.saturating_sub(1);
        self.score += score;
    }

    /// Take a life; returns how many remain
    pub fn player_destroyed(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_state() {
        let state = GameState::default();
        assert_eq!(state.lives, 3);
        assert_eq!(state.targets, 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_target_bookkeeping() {
        let mut state = GameState::new(3);
        state.target_added();
        state.target_added();
        state.target_destroyed(4);
        assert_eq!(state.targets, 1);
        assert_eq!(state.score, 4);

        state.target_destroyed(1);
        state.target_destroyed(1);
        assert_eq!(state.targets, 0);
        assert_eq!(state.score, 6);
    }

    #[test]
    fn test_lives_never_underflow() {
        let mut state = GameState::new(1);
        assert_eq!(state.player_destroyed(), 0);
        assert_eq!(state.player_destroyed(), 0);
    }
}
