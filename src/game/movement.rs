//! # Movement Resolver
//!
//! Walking and flying across the board, including opening treasure chests on arrival.

use crate::{
    generation::open_chest, ConcreteEntity, EntityId, Flyable, GameState, Movable, Occupant,
    OccupantKind, Position, Positioned, RuleResult, RuleViolation, Taggable,
};
use log::debug;

/// How a character travels to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    /// Pays movement cost per cell of Manhattan distance
    Walk,
    /// Pays a fixed cost regardless of distance
    Fly,
}

impl GameState {
    /// Walks a character to `destination`.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{CharacterClass, GameState, Position, Rules};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut state = GameState::new(8, 8, Rules::default(), StdRng::seed_from_u64(3));
    /// let warrior = state.spawn_character(CharacterClass::Warrior, Position::new(2, 2)).unwrap();
    ///
    /// let text = state.move_character(warrior, Position::new(3, 2)).unwrap();
    /// assert_eq!(text, "Warrior moved to cell (3, 2).");
    /// assert_eq!(state.character("w").unwrap().stats.energy, 49);
    /// ```
    pub fn move_character(&mut self, actor: EntityId, destination: Position) -> RuleResult<String> {
        self.travel(actor, destination, Travel::Walk)
    }

    /// Flies a winged character to `destination` for a fixed energy cost.
    pub fn fly_character(&mut self, actor: EntityId, destination: Position) -> RuleResult<String> {
        self.travel(actor, destination, Travel::Fly)
    }

    fn travel(&mut self, actor: EntityId, destination: Position, mode: Travel) -> RuleResult<String> {
        let character = self.acting_character(actor)?;
        let name = character.name();
        let origin = character.position;
        let tag = character.tag();

        let (cost, verb) = match mode {
            Travel::Walk => {
                self.board().ensure_contains(destination)?;
                (character.walk_cost(destination), "moved")
            }
            Travel::Fly => {
                let cost = character.flight_cost().ok_or_else(|| {
                    RuleViolation::UnsupportedAction(format!("{} cannot fly.", name))
                })?;
                self.board().ensure_contains(destination)?;
                (cost, "flew")
            }
        };

        if cost > character.energy() {
            return Err(RuleViolation::InsufficientEnergy(format!(
                "Not enough energy! {} has {} energy, but the move costs {}.",
                name,
                character.energy(),
                cost
            )));
        }

        let cell = self.board().cell_at(destination)?;
        let mut narrative = format!("{} {} to cell {}.", name, verb, destination);

        match cell.occupant() {
            Some(occupant) if occupant.kind == OccupantKind::Chest => {
                if cell.is_protected() {
                    let mut message = "The cell is guarded by enemies! There is a treasure chest in it.\nEnemies:".to_string();
                    for line in self.describe_protectors(destination) {
                        message.push('\n');
                        message.push_str(&line);
                    }
                    return Err(RuleViolation::CellDefended(message));
                }
                let chest = occupant.id;
                narrative.push_str(&self.loot_chest(chest));
            }
            Some(occupant) => {
                let blocker = self
                    .entity(occupant.id)
                    .map(crate::Informable::info)
                    .unwrap_or_default();
                return Err(RuleViolation::CellBlocked(format!(
                    "Cannot move to this cell, another object already stands there.\n{}",
                    blocker
                )));
            }
            None if cell.is_protected() => {
                let mut message = "The cell is guarded by enemies!\nEnemies:".to_string();
                for line in self.describe_protectors(destination) {
                    message.push('\n');
                    message.push_str(&line);
                }
                return Err(RuleViolation::CellDefended(message));
            }
            None => {}
        }

        self.vacate(origin, actor);
        self.board_mut()
            .cell_at_mut(destination)?
            .set_occupant(Some(Occupant {
                id: actor,
                tag,
                kind: OccupantKind::Character,
            }));
        if let Some(character) = self
            .entity_mut(actor)
            .and_then(ConcreteEntity::as_character_mut)
        {
            character.set_position(destination);
            character.spend_energy(cost);
        }
        self.statistics_mut().energy_spent += cost.max(0) as u64;

        debug!("{} {} {} -> {} for {} energy", name, verb, origin, destination, cost);
        Ok(narrative)
    }

    /// Opens an unguarded chest, hands out its treasure and removes it from the board.
    fn loot_chest(&mut self, chest_id: EntityId) -> String {
        let chest = match self.remove_entity(chest_id) {
            Some(ConcreteEntity::Chest(chest)) => chest,
            Some(other) => {
                self.restore_entity(other);
                return String::new();
            }
            None => return String::new(),
        };

        let item = open_chest(&chest, self.rng_mut());
        self.vacate(chest.position, chest_id);
        let bonus = self.rules().scores.chest;
        self.add_score(bonus);
        self.statistics_mut().chests_opened += 1;

        let mut text = format!(
            "\nThere is a chest in the cell. Opening the chest...\nThe chest holds \"{}\"!",
            item.name
        );

        if item.is_elixir() {
            text.push('\n');
            text.push_str(&self.inventory_mut().add_item(item));
        } else if let Some(class) = item.target_class {
            let owner = self
                .id_of(&class.tag())
                .filter(|_| self.is_friendly(&class.tag()));
            match owner.and_then(|id| self.entity_mut(id)).and_then(ConcreteEntity::as_character_mut) {
                Some(character) => {
                    let line = match item.apply(character) {
                        Ok(line) => line,
                        Err(violation) => violation.to_string(),
                    };
                    text.push('\n');
                    text.push_str(&line);
                }
                None => text.push_str(&format!(
                    "\nThere is no {} in your party, the item is left behind.",
                    class
                )),
            }
        }

        debug!("chest {} opened at {}", chest_id, chest.position);
        text
    }
}
