//! # Items
//!
//! Treasures found in chests: elixirs kept in the backpack and class equipment that
//! upgrades a character on the spot.

use crate::{CharacterClass, PlayableCharacter, RuleResult, RuleViolation, Stat};
use serde::{Deserialize, Serialize};

/// Potion categories addressable by `use(<category>)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PotionKind {
    Health,
    Energy,
}

impl PotionKind {
    /// Parses the category argument of the `use` action.
    pub fn from_category(category: &str) -> Option<PotionKind> {
        match category {
            "health" => Some(PotionKind::Health),
            "energy" => Some(PotionKind::Energy),
            _ => None,
        }
    }

    pub fn category(self) -> &'static str {
        match self {
            PotionKind::Health => "health",
            PotionKind::Energy => "energy",
        }
    }
}

/// Every kind of treasure a chest can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    HealthPotion,
    EnergyPotion,
    Staff,
    Sword,
    Bow,
    MagicLamp,
}

impl ItemKind {
    /// Default chest content pool.
    pub const ALL: [ItemKind; 6] = [
        ItemKind::HealthPotion,
        ItemKind::EnergyPotion,
        ItemKind::Staff,
        ItemKind::Bow,
        ItemKind::Sword,
        ItemKind::MagicLamp,
    ];

    /// Class allowed to use the item, `None` for anyone.
    pub fn target_class(self) -> Option<CharacterClass> {
        match self {
            ItemKind::HealthPotion | ItemKind::EnergyPotion => None,
            ItemKind::Staff => Some(CharacterClass::Mage),
            ItemKind::Sword => Some(CharacterClass::Warrior),
            ItemKind::Bow => Some(CharacterClass::Archer),
            ItemKind::MagicLamp => Some(CharacterClass::Fairy),
        }
    }

    pub fn potion(self) -> Option<PotionKind> {
        match self {
            ItemKind::HealthPotion => Some(PotionKind::Health),
            ItemKind::EnergyPotion => Some(PotionKind::Energy),
            _ => None,
        }
    }
}

/// A concrete treasure with its rolled stat deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    pub target_class: Option<CharacterClass>,
    /// Applied in order when the item is used
    pub deltas: Vec<(Stat, i32)>,
}

impl Item {
    /// Elixir restoring 50 health.
    pub fn health_potion() -> Self {
        Self {
            name: "Health Elixir".to_string(),
            kind: ItemKind::HealthPotion,
            target_class: None,
            deltas: vec![(Stat::Health, 50)],
        }
    }

    /// Elixir restoring 50 energy.
    pub fn energy_potion() -> Self {
        Self {
            name: "Energy Elixir".to_string(),
            kind: ItemKind::EnergyPotion,
            target_class: None,
            deltas: vec![(Stat::Energy, 50)],
        }
    }

    /// Elixirs go to the backpack instead of being applied right away.
    pub fn is_elixir(&self) -> bool {
        self.kind.potion().is_some()
    }

    /// Applies the stat deltas to a character.
    ///
    /// Fails with `ClassMismatch` without touching the character when the item is
    /// meant for another class.
    pub fn apply(&self, character: &mut PlayableCharacter) -> RuleResult<String> {
        if let Some(class) = self.target_class {
            if class != character.class {
                return Err(RuleViolation::ClassMismatch(format!(
                    "A character of this class cannot use the item. The item is meant for: {}. Character class: {}.",
                    class, character.class
                )));
            }
        }

        let mut result = format!(
            "Item \"{}\" was used. Character {} received upgrades!",
            self.name,
            character.name()
        );

        for &(stat, delta) in &self.deltas {
            character.stats.adjust(stat, delta);
            result.push_str(&format!(
                " Stat \"{}\" was {} by {}.",
                stat.display_name(),
                if delta > 0 { "increased" } else { "decreased" },
                delta.abs()
            ));
        }

        Ok(result)
    }

    pub fn info(&self) -> String {
        let changes: Vec<String> = Stat::ALL
            .iter()
            .filter_map(|&stat| {
                self.deltas
                    .iter()
                    .find(|(candidate, _)| *candidate == stat)
                    .map(|&(_, delta)| {
                        format!(
                            "{} \"{}\" by {}",
                            if delta > 0 { "increases" } else { "decreases" },
                            stat.display_name(),
                            delta.abs()
                        )
                    })
            })
            .collect();

        format!(
            "Treasure \"{}\". When used it {}.",
            self.name,
            changes.join(", ")
        )
    }
}
