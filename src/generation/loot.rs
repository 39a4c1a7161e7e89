//! # Loot Generation
//!
//! Chest placement and the random treasure a chest yields when opened.

use crate::{
    DungeonError, DungeonResult, GenerationConfig, Generator, Item, ItemKind, Position, Stat,
    TreasureChest,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

const STAFF_NAMES: [&str; 4] = [
    "Merlin's Staff",
    "Staff of Fire",
    "Staff of Thunder",
    "Scepter of Zeus",
];

const SWORD_NAMES: [&str; 4] = [
    "Sword of Damocles",
    "King Arthur's Sword",
    "Sharpened Falcata",
    "Emperor's Katana",
];

const BOW_NAMES: [&str; 4] = [
    "Cupid's Bow",
    "Hawk Bow",
    "English Longbow",
    "Composite Bow",
];

const MAGIC_LAMP_NAME: &str = "Magic Lamp";

fn pick_name(names: &[&str], rng: &mut StdRng) -> String {
    names.choose(rng).copied().unwrap_or_default().to_string()
}

/// Rolls a concrete item of the given kind.
///
/// # Examples
///
/// ```
/// use console_dungeon::{roll_item, CharacterClass, ItemKind, Stat};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let staff = roll_item(ItemKind::Staff, &mut rng);
/// assert_eq!(staff.target_class, Some(CharacterClass::Mage));
/// assert_eq!(staff.deltas[0], (Stat::Range, 1));
/// ```
pub fn roll_item(kind: ItemKind, rng: &mut StdRng) -> Item {
    let (name, deltas) = match kind {
        ItemKind::HealthPotion => return Item::health_potion(),
        ItemKind::EnergyPotion => return Item::energy_potion(),
        ItemKind::Staff => (
            pick_name(&STAFF_NAMES, rng),
            vec![(Stat::Range, 1), (Stat::RangedAttack, rng.gen_range(10..=20))],
        ),
        ItemKind::Sword => (
            pick_name(&SWORD_NAMES, rng),
            vec![
                (Stat::CloseAttack, rng.gen_range(10..=30)),
                (Stat::Energy, rng.gen_range(10..=30)),
                (Stat::Health, rng.gen_range(10..=30)),
            ],
        ),
        ItemKind::Bow => (
            pick_name(&BOW_NAMES, rng),
            vec![
                (Stat::RangedAttack, rng.gen_range(10..=30)),
                (Stat::Energy, rng.gen_range(10..=30)),
            ],
        ),
        ItemKind::MagicLamp => (
            MAGIC_LAMP_NAME.to_string(),
            vec![
                (Stat::RangedAttack, rng.gen_range(10..=30)),
                (Stat::Energy, rng.gen_range(10..=30)),
            ],
        ),
    };

    Item {
        name,
        kind,
        target_class: kind.target_class(),
        deltas,
    }
}

/// Draws one item uniformly from the chest's content pool.
pub fn open_chest(chest: &TreasureChest, rng: &mut StdRng) -> Item {
    let kind = chest
        .contents
        .choose(rng)
        .copied()
        .unwrap_or(ItemKind::HealthPotion);
    roll_item(kind, rng)
}

/// Picks one cell from every chest candidate group.
#[derive(Debug, Clone, Default)]
pub struct ChestGenerator;

impl Generator<Vec<Position>> for ChestGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DungeonResult<Vec<Position>> {
        let cells = config
            .chest_candidates
            .iter()
            .filter_map(|group| group.choose(rng).copied())
            .collect();

        self.validate(&cells, config)?;
        Ok(cells)
    }

    fn validate(&self, cells: &Vec<Position>, config: &GenerationConfig) -> DungeonResult<()> {
        if cells.len() != config.chest_candidates.len() {
            return Err(DungeonError::InvalidConfig(
                "every chest candidate group needs at least one cell".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ChestGenerator"
    }
}
