//! # Rules
//!
//! Tunable rule parameters shared by the resolvers of one session.

use crate::config;
use crate::ScoreTable;
use serde::{Deserialize, Serialize};

/// Which defender stat powers the counter-attack after a ranged shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetaliationStat {
    /// Defenders always strike back with their melee attack.
    CloseAttack,
    /// Defenders answer a shot with their ranged attack and a blow with melee.
    Matching,
}

/// Rule parameters of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub scores: ScoreTable,
    pub fly_energy_cost: i32,
    pub retaliation: RetaliationStat,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            scores: ScoreTable::default(),
            fly_energy_cost: config::FLY_ENERGY_COST,
            retaliation: RetaliationStat::CloseAttack,
        }
    }
}
