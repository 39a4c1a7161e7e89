//! # Encounter Generation
//!
//! Enemy races, enemy classes and the seeded stat rolls that turn the fixed enemy
//! layout into concrete opponents.

use crate::utils::math::{combined, percent, scale};
use crate::{
    DungeonError, DungeonResult, EnemyProfile, GenerationConfig, Generator, Position,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Base value of every enemy stat before multipliers.
pub const BASE_ENEMY_STAT: i32 = 100;

/// Bounds of the per-stat random coefficient, in percent.
pub const MIN_ROLL_PERCENT: u32 = 90;
pub const MAX_ROLL_PERCENT: u32 = 100;

/// Stat multipliers in (health, ranged attack, close attack) order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatMultipliers {
    pub health: f64,
    pub ranged_attack: f64,
    pub close_attack: f64,
}

/// Enemy races. The Dragon only appears as the boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyRace {
    Goblin,
    Ogre,
    Golem,
    Dragon,
}

impl EnemyRace {
    /// Races rolled for regular enemies.
    pub const REGULAR: [EnemyRace; 3] = [EnemyRace::Goblin, EnemyRace::Ogre, EnemyRace::Golem];

    /// Races rolled for the boss.
    pub const BOSSES: [EnemyRace; 1] = [EnemyRace::Dragon];

    pub fn name(self) -> &'static str {
        match self {
            EnemyRace::Goblin => "Goblin",
            EnemyRace::Ogre => "Ogre",
            EnemyRace::Golem => "Golem",
            EnemyRace::Dragon => "Dragon",
        }
    }

    pub fn multipliers(self) -> StatMultipliers {
        let (health, ranged_attack, close_attack) = match self {
            EnemyRace::Goblin => (0.5, 0.8, 0.8),
            EnemyRace::Ogre => (1.0, 0.5, 0.5),
            EnemyRace::Golem => (3.0, 0.1, 0.25),
            EnemyRace::Dragon => (5.0, 1.0, 1.0),
        };
        StatMultipliers {
            health,
            ranged_attack,
            close_attack,
        }
    }

    /// Classes a member of this race can have; empty for classless races.
    pub fn classes(self) -> &'static [EnemyClass] {
        match self {
            EnemyRace::Goblin => &[EnemyClass::Warrior, EnemyClass::Archer],
            EnemyRace::Ogre => &[EnemyClass::Warrior, EnemyClass::Mage],
            EnemyRace::Golem | EnemyRace::Dragon => &[],
        }
    }
}

/// Enemy classes layered on top of a race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    Warrior,
    Archer,
    Mage,
}

impl EnemyClass {
    pub fn name(self) -> &'static str {
        match self {
            EnemyClass::Warrior => "Warrior",
            EnemyClass::Archer => "Archer",
            EnemyClass::Mage => "Mage",
        }
    }

    pub fn multipliers(self) -> StatMultipliers {
        let (health, ranged_attack, close_attack) = match self {
            EnemyClass::Warrior => (2.0, 0.5, 1.0),
            EnemyClass::Archer => (1.0, 2.0, 0.25),
            EnemyClass::Mage => (1.0, 2.0, 0.1),
        };
        StatMultipliers {
            health,
            ranged_attack,
            close_attack,
        }
    }
}

/// Builds a profile for a given race and class with explicit per-stat rolls.
///
/// # Examples
///
/// ```
/// use console_dungeon::{build_profile, EnemyClass, EnemyRace};
///
/// let profile = build_profile(EnemyRace::Goblin, Some(EnemyClass::Warrior), 1.0, [100, 100, 100]);
/// assert_eq!(profile.name, "Goblin Warrior");
/// assert_eq!(profile.health, 100);
/// assert_eq!(profile.ranged_attack, 40);
/// assert_eq!(profile.close_attack, 80);
/// ```
pub fn build_profile(
    race: EnemyRace,
    class: Option<EnemyClass>,
    difficulty: f64,
    rolls: [u32; 3],
) -> EnemyProfile {
    let race_mult = race.multipliers();
    let class_mult = class.map(EnemyClass::multipliers).unwrap_or(StatMultipliers {
        health: 1.0,
        ranged_attack: 1.0,
        close_attack: 1.0,
    });

    let stat = |race: f64, class: f64, roll: u32| {
        scale(
            BASE_ENEMY_STAT,
            combined(&[race, class, difficulty, percent(roll)]),
        )
    };

    let name = match class {
        Some(class) => format!("{} {}", race.name(), class.name()),
        None => race.name().to_string(),
    };

    EnemyProfile {
        name,
        health: stat(race_mult.health, class_mult.health, rolls[0]),
        ranged_attack: stat(race_mult.ranged_attack, class_mult.ranged_attack, rolls[1]),
        close_attack: stat(race_mult.close_attack, class_mult.close_attack, rolls[2]),
    }
}

/// Rolls race, class and stat coefficients for one enemy.
pub fn roll_enemy_profile(is_boss: bool, difficulty: f64, rng: &mut StdRng) -> EnemyProfile {
    let races: &[EnemyRace] = if is_boss {
        &EnemyRace::BOSSES
    } else {
        &EnemyRace::REGULAR
    };
    let race = races.choose(rng).copied().unwrap_or(EnemyRace::Golem);
    let class = race.classes().choose(rng).copied();

    let mut rolls = [MAX_ROLL_PERCENT; 3];
    for roll in rolls.iter_mut() {
        *roll = rng.gen_range(MIN_ROLL_PERCENT..=MAX_ROLL_PERCENT);
    }

    build_profile(race, class, difficulty, rolls)
}

/// A rolled enemy ready to be placed on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawn {
    pub profile: EnemyProfile,
    pub position: Position,
    pub protected: Vec<Position>,
    pub is_boss: bool,
}

/// Rolls every enemy of the layout, the boss last.
#[derive(Debug, Clone, Default)]
pub struct EncounterGenerator;

impl Generator<Vec<EnemySpawn>> for EncounterGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DungeonResult<Vec<EnemySpawn>> {
        let mut spawns: Vec<EnemySpawn> = config
            .enemy_layout
            .iter()
            .map(|placement| EnemySpawn {
                profile: roll_enemy_profile(false, config.difficulty, rng),
                position: placement.position,
                protected: placement.protected.clone(),
                is_boss: false,
            })
            .collect();

        spawns.push(EnemySpawn {
            profile: roll_enemy_profile(true, config.boss_difficulty, rng),
            position: config.boss_position,
            protected: Vec::new(),
            is_boss: true,
        });

        self.validate(&spawns, config)?;
        Ok(spawns)
    }

    fn validate(&self, spawns: &Vec<EnemySpawn>, _config: &GenerationConfig) -> DungeonResult<()> {
        let bosses = spawns.iter().filter(|spawn| spawn.is_boss).count();
        if bosses != 1 {
            return Err(DungeonError::InvalidConfig(format!(
                "expected exactly one boss, found {}",
                bosses
            )));
        }
        if let Some(spawn) = spawns.iter().find(|spawn| spawn.profile.health <= 0) {
            return Err(DungeonError::InvalidConfig(format!(
                "enemy at {} would start without health",
                spawn.position
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "EncounterGenerator"
    }
}
