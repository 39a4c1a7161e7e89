//! # Game Module
//!
//! Core game state management, board representation, and entity systems.
//!
//! This module contains the fundamental building blocks of the dungeon:
//! - The board and its cells, including the protected-cell mechanic
//! - The entity model (characters, enemies, chests) and capability traits
//! - Items and the session backpack
//! - Movement, combat and scoring resolvers operating on [`GameState`]

pub mod board;
pub mod combat;
pub mod entities;
pub mod inventory;
pub mod items;
pub mod movement;
pub mod rules;
pub mod scoring;
pub mod state;

pub use board::*;
pub use combat::{AttackKind, Target};
pub use entities::*;
pub use inventory::*;
pub use items::*;
pub use movement::Travel;
pub use rules::*;
pub use scoring::*;
pub use state::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a 1-based coordinate on the board.
///
/// # Examples
///
/// ```
/// use console_dungeon::Position;
///
/// let pos = Position::new(2, 5);
/// assert_eq!(pos.x, 2);
/// assert_eq!(pos.y, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// Movement is charged along the grid axes, so this is the walking distance.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::Position;
    ///
    /// let pos1 = Position::new(1, 1);
    /// let pos2 = Position::new(4, 5);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Calculates the Chebyshev distance to another position.
    ///
    /// Used for attack reach: diagonal neighbours are at distance 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::Position;
    ///
    /// let pos1 = Position::new(1, 1);
    /// let pos2 = Position::new(2, 2);
    /// assert_eq!(pos1.chebyshev_distance(pos2), 1);
    /// ```
    pub fn chebyshev_distance(self, other: Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier for entities within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Short string addressing an entity from commands.
pub type Tag = String;

/// Tag rendered for treasure chests.
pub const CHEST_TAG: &str = "t";

/// Tag of the boss enemy.
pub const BOSS_TAG: &str = "b";

/// Prefix of regular enemy tags, followed by the enemy number.
pub const ENEMY_TAG_PREFIX: &str = "e";

/// Numeric statistics an entity or item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Health,
    Energy,
    Range,
    CloseAttack,
    RangedAttack,
    AttackEnergyCost,
    MoveEnergyCost,
}

impl Stat {
    /// Display order used in entity and item descriptions.
    pub const ALL: [Stat; 7] = [
        Stat::Health,
        Stat::Energy,
        Stat::Range,
        Stat::CloseAttack,
        Stat::RangedAttack,
        Stat::AttackEnergyCost,
        Stat::MoveEnergyCost,
    ];

    /// Human-readable stat name.
    pub fn display_name(self) -> &'static str {
        match self {
            Stat::Health => "health",
            Stat::Energy => "energy",
            Stat::Range => "attack range",
            Stat::CloseAttack => "melee attack",
            Stat::RangedAttack => "ranged attack",
            Stat::AttackEnergyCost => "attack energy cost",
            Stat::MoveEnergyCost => "movement energy cost",
        }
    }
}

/// Something that occupies a board position.
pub trait Positioned {
    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);
}

/// Something addressable by a tag.
pub trait Taggable {
    fn tag(&self) -> Tag;
}

/// Something that can describe itself to the player.
pub trait Informable {
    fn info(&self) -> String;
}

/// Capability to walk across the board, paying energy per cell.
pub trait Movable: Positioned {
    fn energy(&self) -> i32;
    fn move_energy_cost(&self) -> i32;
    fn spend_energy(&mut self, amount: i32);

    /// Energy a walk to `destination` would cost.
    fn walk_cost(&self, destination: Position) -> i32 {
        self.position().manhattan_distance(destination) * self.move_energy_cost()
    }
}

/// Capability to fly to any cell for a fixed energy cost.
pub trait Flyable: Movable {
    /// Fixed cost of one flight, or `None` when the entity has no wings.
    fn flight_cost(&self) -> Option<i32>;
}
