//! # Inventory
//!
//! The session backpack holding elixirs for later use.

use crate::{Item, PlayableCharacter, PotionKind, RuleResult, RuleViolation};
use serde::{Deserialize, Serialize};

/// Backpack shared by all characters of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backpack with the starting supply of one health and one energy elixir.
    pub fn with_starting_supply() -> Self {
        Self {
            items: vec![Item::health_potion(), Item::energy_potion()],
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Stores an item and returns the narrative line for it.
    pub fn add_item(&mut self, item: Item) -> String {
        let line = format!("Item \"{}\" was added to the backpack.", item.name);
        self.items.push(item);
        line
    }

    /// Drinks the first elixir of the category.
    ///
    /// The elixir leaves the backpack only when it was applied successfully.
    pub fn use_potion(
        &mut self,
        potion: PotionKind,
        character: &mut PlayableCharacter,
    ) -> RuleResult<String> {
        let index = self
            .items
            .iter()
            .position(|item| item.kind.potion() == Some(potion))
            .ok_or_else(|| {
                RuleViolation::NoSuchItem(format!(
                    "You are out of {} elixirs!",
                    potion.category()
                ))
            })?;

        let result = self.items[index].apply(character)?;
        self.items.remove(index);

        Ok(result)
    }

    /// Count-aware summary followed by one line per item.
    pub fn info(&self) -> String {
        match self.items.len() {
            0 => "Your backpack is empty.".to_string(),
            count => {
                let mut result = if count == 1 {
                    "Your backpack holds 1 item.".to_string()
                } else {
                    format!("Your backpack holds {} items.", count)
                };
                for item in &self.items {
                    result.push_str(&format!("\n* {}", item.info()));
                }
                result
            }
        }
    }
}
