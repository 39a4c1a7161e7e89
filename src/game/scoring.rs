//! # Scoring & End Conditions
//!
//! Score table, per-session statistics and the win/loss evaluation.

use crate::config;
use serde::{Deserialize, Serialize};

/// Points awarded or deducted for game events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub chest: i64,
    pub enemy: i64,
    pub boss: i64,
    /// Deducted when a friendly character dies
    pub friendly_death: i64,
    /// Deducted per executed action at final scoring
    pub action: i64,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            chest: config::CHEST_SCORE,
            enemy: config::ENEMY_SCORE,
            boss: config::BOSS_SCORE,
            friendly_death: config::FRIENDLY_DEATH_PENALTY,
            action: config::ACTION_PENALTY,
        }
    }
}

impl ScoreTable {
    /// Final score given the accumulated score and the number of executed actions.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::ScoreTable;
    ///
    /// let table = ScoreTable::default();
    /// assert_eq!(table.final_score(150, 4), 130);
    /// ```
    pub fn final_score(&self, accumulated: i64, actions: usize) -> i64 {
        accumulated - actions as i64 * self.action
    }
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    /// The boss was defeated
    Victory,
    /// Every friendly character died
    Defeat,
    /// The player or the registry ended the game
    Abandoned,
}

impl GameOutcome {
    /// Audit event name of the outcome.
    pub fn event_name(self) -> &'static str {
        match self {
            GameOutcome::Victory => "victory",
            GameOutcome::Defeat => "defeat",
            GameOutcome::Abandoned => "abandoned",
        }
    }

    /// Narrative headline preceding the final score.
    pub fn headline(self) -> Option<&'static str> {
        match self {
            GameOutcome::Victory => Some("The main enemy is defeated! You won!"),
            GameOutcome::Defeat => Some("All your characters have fallen! The enemies won!"),
            GameOutcome::Abandoned => None,
        }
    }
}

/// Decides whether the game must end.
///
/// Defeat is checked first, so a party that falls while killing the boss still loses.
pub fn evaluate_end_conditions(friendly_remaining: bool, boss_present: bool) -> Option<GameOutcome> {
    if !friendly_remaining {
        Some(GameOutcome::Defeat)
    } else if !boss_present {
        Some(GameOutcome::Victory)
    } else {
        None
    }
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Number of regular enemies defeated
    pub enemies_defeated: u32,
    /// Number of bosses defeated
    pub bosses_defeated: u32,
    /// Number of chests opened
    pub chests_opened: u32,
    /// Number of friendly characters lost
    pub characters_lost: u32,
    /// Total damage dealt to enemies
    pub damage_dealt: u64,
    /// Total damage taken by the party
    pub damage_taken: u64,
    /// Energy spent on movement
    pub energy_spent: u64,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line summary used in the audit record.
    pub fn summary(&self) -> String {
        format!(
            "enemies_defeated={} bosses_defeated={} chests_opened={} characters_lost={} damage_dealt={} damage_taken={} energy_spent={}",
            self.enemies_defeated,
            self.bosses_defeated,
            self.chests_opened,
            self.characters_lost,
            self.damage_dealt,
            self.damage_taken,
            self.energy_spent
        )
    }
}
