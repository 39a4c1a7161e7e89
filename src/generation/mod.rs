//! # Generation Module
//!
//! Dungeon layout configuration and the seeded generators that populate a session.
//!
//! The layout itself is fixed data carried by [`GenerationConfig`]; randomness only
//! decides chest cells, enemy races and classes, stat coefficients and loot.

pub mod dungeon;
pub mod encounters;
pub mod loot;

pub use dungeon::*;
pub use encounters::*;
pub use loot::*;

use crate::{config, CharacterClass, DungeonError, DungeonResult, Position, Rules};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Starting cell of one playable character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPlacement {
    pub class: CharacterClass,
    pub position: Position,
}

/// Cell of a regular enemy and the cells it guards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyPlacement {
    pub position: Position,
    pub protected: Vec<Position>,
}

impl EnemyPlacement {
    fn from_coords(position: (i32, i32), protected: &[(i32, i32)]) -> Self {
        Self {
            position: Position::new(position.0, position.1),
            protected: protected
                .iter()
                .map(|&(x, y)| Position::new(x, y))
                .collect(),
        }
    }
}

/// Configuration for dungeon generation.
///
/// Controls the board size, the fixed layout, difficulty scaling and the rule set
/// handed to the generated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    pub width: i32,
    pub length: i32,
    /// Multiplier applied to regular enemy stats
    pub difficulty: f64,
    /// Multiplier applied to boss stats
    pub boss_difficulty: f64,
    pub characters: Vec<CharacterPlacement>,
    pub enemy_layout: Vec<EnemyPlacement>,
    pub boss_position: Position,
    /// One chest is placed on a random cell of every group
    pub chest_candidates: Vec<Vec<Position>>,
    pub rules: Rules,
}

fn standard_party() -> Vec<CharacterPlacement> {
    [
        (CharacterClass::Fairy, 1, 1),
        (CharacterClass::Archer, 2, 1),
        (CharacterClass::Mage, 1, 2),
        (CharacterClass::Warrior, 2, 2),
    ]
    .into_iter()
    .map(|(class, x, y)| CharacterPlacement {
        class,
        position: Position::new(x, y),
    })
    .collect()
}

impl GenerationConfig {
    /// Creates the standard 8×8 layout with seven guards and the dragon.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.width, 8);
    /// assert_eq!(config.enemy_layout.len(), 7);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        let enemy_layout = vec![
            EnemyPlacement::from_coords(
                (2, 5),
                &[(1, 5), (1, 6), (1, 7), (1, 8), (2, 6), (2, 7), (2, 8), (3, 5)],
            ),
            EnemyPlacement::from_coords(
                (3, 6),
                &[(3, 7), (4, 6), (4, 7), (4, 8), (5, 6), (5, 8)],
            ),
            EnemyPlacement::from_coords(
                (5, 2),
                &[(5, 1), (5, 3), (6, 1), (6, 2), (7, 1), (7, 2), (8, 1), (8, 2)],
            ),
            EnemyPlacement::from_coords(
                (6, 3),
                &[(6, 4), (7, 3), (7, 4), (7, 5), (8, 3), (8, 4), (8, 5)],
            ),
            EnemyPlacement::from_coords((5, 5), &[(5, 6), (5, 7), (6, 5), (7, 5), (6, 6)]),
            EnemyPlacement::from_coords((6, 7), &[(6, 8), (7, 7), (7, 8)]),
            EnemyPlacement::from_coords((7, 6), &[(7, 7), (8, 6), (8, 7)]),
        ];

        let chest_candidates = [
            [(1, 7), (2, 7)],
            [(3, 8), (4, 8)],
            [(7, 1), (7, 2)],
            [(8, 3), (8, 4)],
        ]
        .iter()
        .map(|group| group.iter().map(|&(x, y)| Position::new(x, y)).collect())
        .collect();

        Self {
            seed,
            width: config::DEFAULT_BOARD_WIDTH,
            length: config::DEFAULT_BOARD_LENGTH,
            difficulty: 1.0,
            boss_difficulty: 1.0,
            characters: standard_party(),
            enemy_layout,
            boss_position: Position::new(8, 8),
            chest_candidates,
            rules: Rules::default(),
        }
    }

    /// Creates a configuration for testing: the party and the boss only.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            enemy_layout: Vec::new(),
            chest_candidates: Vec::new(),
            ..Self::new(seed)
        }
    }

    /// Same layout with a different seed.
    pub fn with_seed(&self, seed: u64) -> Self {
        Self {
            seed,
            ..self.clone()
        }
    }

    /// Checks that the layout fits the board and nothing overlaps.
    pub fn validate(&self) -> DungeonResult<()> {
        if self.width < 1 || self.length < 1 {
            return Err(DungeonError::InvalidConfig(format!(
                "board size {}x{} is not playable",
                self.width, self.length
            )));
        }
        if !(self.difficulty.is_finite() && self.difficulty > 0.0)
            || !(self.boss_difficulty.is_finite() && self.boss_difficulty > 0.0)
        {
            return Err(DungeonError::InvalidConfig(
                "difficulty multipliers must be positive".to_string(),
            ));
        }
        if self.characters.is_empty() {
            return Err(DungeonError::InvalidConfig(
                "the party needs at least one character".to_string(),
            ));
        }
        if self.rules.fly_energy_cost < 0 {
            return Err(DungeonError::InvalidConfig(
                "flight cannot have a negative cost".to_string(),
            ));
        }

        let inside = |position: Position| {
            (1..=self.width).contains(&position.x) && (1..=self.length).contains(&position.y)
        };

        let mut classes = HashSet::new();
        let mut occupied = HashSet::new();
        let mut claim = |position: Position, what: &str| -> DungeonResult<()> {
            if !inside(position) {
                return Err(DungeonError::InvalidConfig(format!(
                    "{} at {} lies outside the board",
                    what, position
                )));
            }
            if !occupied.insert(position) {
                return Err(DungeonError::InvalidConfig(format!(
                    "{} at {} overlaps another placement",
                    what, position
                )));
            }
            Ok(())
        };

        for placement in &self.characters {
            if !classes.insert(placement.class) {
                return Err(DungeonError::InvalidConfig(format!(
                    "the party has more than one {}",
                    placement.class
                )));
            }
            claim(placement.position, placement.class.name())?;
        }
        for placement in &self.enemy_layout {
            claim(placement.position, "enemy")?;
        }
        claim(self.boss_position, "boss")?;
        for group in &self.chest_candidates {
            if group.is_empty() {
                return Err(DungeonError::InvalidConfig(
                    "empty chest candidate group".to_string(),
                ));
            }
            for &cell in group {
                claim(cell, "chest candidate")?;
            }
        }

        for placement in &self.enemy_layout {
            if let Some(cell) = placement.protected.iter().find(|&&cell| !inside(cell)) {
                return Err(DungeonError::InvalidConfig(format!(
                    "guarded cell {} lies outside the board",
                    cell
                )));
            }
        }

        Ok(())
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn save_to_json(&self) -> DungeonResult<String> {
        serde_json::to_string_pretty(self).map_err(DungeonError::from)
    }

    /// Parses and validates a configuration from JSON.
    pub fn load_from_json(json: &str) -> DungeonResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load_from_file(path: impl AsRef<Path>) -> DungeonResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::load_from_json(&json)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// Every generation step implements this trait, so steps can be validated and
/// logged the same way.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DungeonResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DungeonResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}

/// Generates a complete dungeon from the configuration's own seed.
pub fn generate_dungeon(config: &GenerationConfig) -> DungeonResult<GeneratedDungeon> {
    let mut rng = utils::create_rng(config);
    DungeonGenerator::new().generate(config, &mut rng)
}
