//! # Dungeon Generation
//!
//! Assembles a ready-to-play [`GameState`] from a [`GenerationConfig`].
//!
//! Population happens in a fixed order: the backpack, the treasure chests, the
//! party, then the enemies with the boss last. Every step appends to the start-up
//! report shown to the player when the session begins.

use crate::{
    ChestGenerator, DungeonResult, EncounterGenerator, GameState, GenerationConfig, Generator,
    Informable, Item,
};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A freshly generated game together with its start-up report.
#[derive(Debug, Clone)]
pub struct GeneratedDungeon {
    pub state: GameState,
    /// One entry per report line, blank entries separate sections
    pub report: Vec<String>,
}

impl GeneratedDungeon {
    /// Report joined into a single block of text.
    pub fn report_text(&self) -> String {
        self.report.join("\n")
    }
}

/// Generator placing the party, the enemies and the chests on the board.
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator {
    pub chests: ChestGenerator,
    pub encounters: EncounterGenerator,
}

impl DungeonGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Generator<GeneratedDungeon> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DungeonResult<GeneratedDungeon> {
        config.validate()?;

        let session_rng = StdRng::seed_from_u64(rng.gen());
        let mut state = GameState::new(config.width, config.length, config.rules.clone(), session_rng);
        let mut report = Vec::new();

        report.push("...Preparing the backpack...".to_string());
        report.push("A backpack was created.".to_string());
        report.push("Items added to the backpack:".to_string());
        for item in [Item::health_potion(), Item::energy_potion()] {
            report.push(format!("* {}", item.info()));
            state.inventory_mut().add_item(item);
        }

        report.push(String::new());
        report.push("...Placing treasure chests...".to_string());
        let chests = self.chests.generate(config, rng)?;
        debug!("{} picked {} cells", self.chests.generator_type(), chests.len());
        for cell in chests {
            state.spawn_chest(cell)?;
            report.push(format!("A treasure chest was placed in cell {}.", cell));
        }

        report.push(String::new());
        report.push("...Creating characters...".to_string());
        for placement in &config.characters {
            let id = state.spawn_character(placement.class, placement.position)?;
            if let Some(character) = state.entity(id) {
                report.push(format!("A character was created. {}", character.info()));
            }
        }

        report.push(String::new());
        report.push("...Creating enemies...".to_string());
        let spawns = self.encounters.generate(config, rng)?;
        debug!("{} rolled {} enemies", self.encounters.generator_type(), spawns.len());
        for spawn in spawns {
            let id = state.spawn_enemy(spawn.profile, spawn.position, &spawn.protected, spawn.is_boss)?;
            if let Some(enemy) = state.entity(id) {
                report.push(format!("* {}", enemy.info()));
            }
        }

        let dungeon = GeneratedDungeon { state, report };
        self.validate(&dungeon, config)?;

        debug!(
            "{} generated dungeon with seed {}: {} entities",
            self.generator_type(),
            config.seed,
            dungeon.state.entities().count()
        );
        Ok(dungeon)
    }

    fn validate(&self, dungeon: &GeneratedDungeon, config: &GenerationConfig) -> DungeonResult<()> {
        if dungeon.state.friendly_tags().len() != config.characters.len() {
            return Err(crate::DungeonError::InvalidConfig(
                "not every character could be placed".to_string(),
            ));
        }
        if !dungeon.state.boss_present() {
            return Err(crate::DungeonError::InvalidConfig(
                "the layout has no boss".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}
