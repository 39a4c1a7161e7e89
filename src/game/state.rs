//! # Game State Module
//!
//! Central game state of one session and coordination between the resolvers.
//!
//! The [`GameState`] owns the board, the entity registry, the backpack, the score
//! and the action history. Movement, combat and item use are implemented as
//! further `impl GameState` blocks in their own modules; all of them validate
//! completely before mutating anything, so a rejected command leaves the state
//! exactly as it was.

use crate::{
    ActionCommand, Board, CharacterClass, ConcreteEntity, DungeonError, DungeonResult, Enemy,
    EnemyProfile, Entity, EntityId, GameOutcome, GameStatistics, Informable, Inventory,
    Occupant, OccupantKind, PlayableCharacter, Position, Positioned, PotionKind, RuleResult,
    RuleViolation, Rules, Tag, Taggable, TreasureChest, BOSS_TAG,
};
use log::debug;
use rand::rngs::StdRng;
use std::collections::{BTreeSet, HashMap};

/// Central game state containing all data of one session.
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    /// All entities on the board, indexed by ID
    entities: HashMap<EntityId, ConcreteEntity>,
    /// Tags of every addressable entity (chests excluded)
    field_tags: BTreeSet<Tag>,
    /// Tags of the player's characters
    friendly_tags: BTreeSet<Tag>,
    /// Tag to entity lookup
    lookup: HashMap<Tag, EntityId>,
    inventory: Inventory,
    score: i64,
    history: Vec<ActionCommand>,
    running: bool,
    outcome: Option<GameOutcome>,
    final_score: Option<i64>,
    statistics: GameStatistics,
    rules: Rules,
    rng: StdRng,
    next_entity_id: u32,
    next_enemy_number: u32,
}

impl GameState {
    /// Creates a running game with an empty board and an empty backpack.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{GameState, Rules};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let state = GameState::new(8, 8, Rules::default(), StdRng::seed_from_u64(7));
    /// assert!(state.is_running());
    /// assert_eq!(state.score(), 0);
    /// ```
    pub fn new(width: i32, length: i32, rules: Rules, rng: StdRng) -> Self {
        Self {
            board: Board::new(width, length),
            entities: HashMap::new(),
            field_tags: BTreeSet::new(),
            friendly_tags: BTreeSet::new(),
            lookup: HashMap::new(),
            inventory: Inventory::new(),
            score: 0,
            history: Vec::new(),
            running: true,
            outcome: None,
            final_score: None,
            statistics: GameStatistics::new(),
            rules,
            rng,
            next_entity_id: 1,
            next_enemy_number: 1,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    fn ensure_placeable(&self, position: Position) -> DungeonResult<()> {
        let cell = self.board.cell_at(position).map_err(|_| {
            DungeonError::InvalidConfig(format!("position {} lies outside the board", position))
        })?;
        if cell.is_occupied() {
            return Err(DungeonError::InvalidConfig(format!(
                "position {} is already occupied",
                position
            )));
        }
        Ok(())
    }

    fn place(&mut self, entity: ConcreteEntity) -> DungeonResult<EntityId> {
        let id = entity.id();
        let position = entity.position();
        let occupant = Occupant {
            id,
            tag: entity.tag(),
            kind: entity.occupant_kind(),
        };

        self.board
            .cell_at_mut(position)
            .map_err(|err| DungeonError::InvalidConfig(err.to_string()))?
            .set_occupant(Some(occupant));
        self.entities.insert(id, entity);

        Ok(id)
    }

    fn register_tag(&mut self, tag: Tag, id: EntityId) -> DungeonResult<()> {
        if self.lookup.contains_key(&tag) {
            return Err(DungeonError::InvalidConfig(format!(
                "tag '{}' is already taken",
                tag
            )));
        }
        self.field_tags.insert(tag.clone());
        self.lookup.insert(tag, id);
        Ok(())
    }

    /// Places a playable character of the given class.
    pub fn spawn_character(
        &mut self,
        class: CharacterClass,
        position: Position,
    ) -> DungeonResult<EntityId> {
        self.ensure_placeable(position)?;
        if self.lookup.contains_key(&class.tag()) {
            return Err(DungeonError::InvalidConfig(format!(
                "a {} is already on the board",
                class
            )));
        }

        let id = self.allocate_id();
        let character =
            PlayableCharacter::new(id, class, position, self.rules.fly_energy_cost);
        let tag = character.tag();

        self.place(character.into())?;
        self.register_tag(tag.clone(), id)?;
        self.friendly_tags.insert(tag);

        Ok(id)
    }

    /// Places an enemy guarding the given cells.
    pub fn spawn_enemy(
        &mut self,
        profile: EnemyProfile,
        position: Position,
        protected: &[Position],
        is_boss: bool,
    ) -> DungeonResult<EntityId> {
        self.ensure_placeable(position)?;
        for &cell in protected {
            if !self.board.contains(cell) {
                return Err(DungeonError::InvalidConfig(format!(
                    "guarded cell {} lies outside the board",
                    cell
                )));
            }
        }
        if is_boss && self.lookup.contains_key(BOSS_TAG) {
            return Err(DungeonError::InvalidConfig(
                "only one boss may be placed".to_string(),
            ));
        }

        let id = self.allocate_id();
        let number = self.next_enemy_number;
        self.next_enemy_number += 1;

        let mut enemy = Enemy::new(id, number, profile, position, is_boss);
        for &cell in protected {
            enemy.add_protected_cell(cell);
            if let Ok(cell) = self.board.cell_at_mut(cell) {
                cell.add_protector(id);
            }
        }
        let tag = enemy.tag();

        self.place(enemy.into())?;
        self.register_tag(tag, id)?;

        Ok(id)
    }

    /// Places a closed treasure chest.
    pub fn spawn_chest(&mut self, position: Position) -> DungeonResult<EntityId> {
        self.ensure_placeable(position)?;
        let id = self.allocate_id();
        self.place(TreasureChest::new(id, position).into())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn entity(&self, id: EntityId) -> Option<&ConcreteEntity> {
        self.entities.get(&id)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut ConcreteEntity> {
        self.entities.get_mut(&id)
    }

    pub(crate) fn remove_entity(&mut self, id: EntityId) -> Option<ConcreteEntity> {
        self.entities.remove(&id)
    }

    pub(crate) fn restore_entity(&mut self, entity: ConcreteEntity) {
        self.entities.insert(entity.id(), entity);
    }

    pub fn entities(&self) -> impl Iterator<Item = &ConcreteEntity> {
        self.entities.values()
    }

    /// Entity registered under a tag.
    pub fn entity_by_tag(&self, tag: &str) -> Option<&ConcreteEntity> {
        self.lookup.get(tag).and_then(|id| self.entities.get(id))
    }

    pub fn id_of(&self, tag: &str) -> Option<EntityId> {
        self.lookup.get(tag).copied()
    }

    pub fn character(&self, tag: &str) -> Option<&PlayableCharacter> {
        self.entity_by_tag(tag).and_then(ConcreteEntity::as_character)
    }

    pub fn character_mut(&mut self, tag: &str) -> Option<&mut PlayableCharacter> {
        let id = self.id_of(tag)?;
        self.entities.get_mut(&id).and_then(ConcreteEntity::as_character_mut)
    }

    pub fn enemy(&self, tag: &str) -> Option<&Enemy> {
        self.entity_by_tag(tag).and_then(ConcreteEntity::as_enemy)
    }

    /// Tags of every entity on the board except chests.
    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.field_tags
    }

    pub fn friendly_tags(&self) -> &BTreeSet<Tag> {
        &self.friendly_tags
    }

    pub fn is_friendly(&self, tag: &str) -> bool {
        self.friendly_tags.contains(tag)
    }

    /// Whether the boss is still in the tag set or the lookup.
    pub fn boss_present(&self) -> bool {
        self.field_tags.contains(BOSS_TAG) || self.lookup.contains_key(BOSS_TAG)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn statistics(&self) -> &GameStatistics {
        &self.statistics
    }

    pub(crate) fn statistics_mut(&mut self) -> &mut GameStatistics {
        &mut self.statistics
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Accumulated score, without the per-action deduction.
    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn add_score(&mut self, delta: i64) {
        self.score += delta;
    }

    /// Successfully executed player actions, oldest first.
    pub fn history(&self) -> &[ActionCommand] {
        &self.history
    }

    pub fn record_action(&mut self, action: ActionCommand) {
        self.history.push(action);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Final score, available once the game has ended.
    pub fn final_score(&self) -> Option<i64> {
        self.final_score
    }

    /// Ends the game and returns the closing message.
    ///
    /// The final score is computed only once; later calls repeat the message.
    pub fn finish(&mut self, outcome: GameOutcome) -> String {
        let final_score = match self.final_score {
            Some(score) => score,
            None => {
                let score = self
                    .rules
                    .scores
                    .final_score(self.score, self.history.len());
                self.final_score = Some(score);
                self.outcome = Some(outcome);
                self.running = false;
                debug!("game finished: {:?}, final score {}", outcome, score);
                score
            }
        };

        let headline = self
            .outcome
            .and_then(GameOutcome::headline)
            .map(|line| format!("{}\n", line))
            .unwrap_or_default();

        format!("{}Game over. Your score: {}.", headline, final_score)
    }

    /// Ends the game when an end condition holds and returns the closing message.
    pub fn check_end_conditions(&mut self) -> Option<String> {
        if !self.running {
            return None;
        }
        let outcome =
            crate::evaluate_end_conditions(!self.friendly_tags.is_empty(), self.boss_present())?;
        Some(self.finish(outcome))
    }

    /// Removes a slain enemy, releases its guarded cells and awards the kill.
    pub(crate) fn destroy_enemy(&mut self, id: EntityId) {
        let enemy = match self.entities.remove(&id) {
            Some(ConcreteEntity::Enemy(enemy)) => enemy,
            Some(other) => {
                self.entities.insert(id, other);
                return;
            }
            None => return,
        };

        self.vacate(enemy.position, id);
        for &position in &enemy.protected_cells {
            if let Ok(cell) = self.board.cell_at_mut(position) {
                cell.remove_protector(id);
            }
        }

        let tag = enemy.tag();
        self.field_tags.remove(&tag);
        self.lookup.remove(&tag);

        if enemy.is_boss {
            self.score += self.rules.scores.boss;
            self.statistics.bosses_defeated += 1;
        } else {
            self.score += self.rules.scores.enemy;
            self.statistics.enemies_defeated += 1;
        }
        debug!("enemy {} destroyed", tag);
    }

    /// Removes a fallen character and applies the death penalty.
    pub(crate) fn destroy_character(&mut self, id: EntityId) -> Option<String> {
        let character = match self.entities.remove(&id) {
            Some(ConcreteEntity::Character(character)) => character,
            Some(other) => {
                self.entities.insert(id, other);
                return None;
            }
            None => return None,
        };

        self.vacate(character.position, id);

        let tag = character.tag();
        self.field_tags.remove(&tag);
        self.friendly_tags.remove(&tag);
        self.lookup.remove(&tag);

        self.score -= self.rules.scores.friendly_death;
        self.statistics.characters_lost += 1;
        debug!("character {} destroyed", tag);

        Some(format!("Your character \"{}\" has fallen!", character.name()))
    }

    /// Clears a cell if the given entity is the one standing in it.
    pub(crate) fn vacate(&mut self, position: Position, id: EntityId) {
        if let Ok(cell) = self.board.cell_at_mut(position) {
            if cell.occupant().map(|occupant| occupant.id) == Some(id) {
                cell.set_occupant(None);
            }
        }
    }

    /// Live playable character acting in a command.
    pub(crate) fn acting_character(&self, actor: EntityId) -> RuleResult<&PlayableCharacter> {
        self.entities
            .get(&actor)
            .and_then(ConcreteEntity::as_character)
            .ok_or_else(actor_unavailable)
    }

    /// Drinks an elixir from the backpack.
    pub fn use_potion(&mut self, actor: EntityId, potion: PotionKind) -> RuleResult<String> {
        let character = self
            .entities
            .get_mut(&actor)
            .and_then(ConcreteEntity::as_character_mut)
            .ok_or_else(actor_unavailable)?;

        let text = self.inventory.use_potion(potion, character)?;
        debug!("{} used a {} elixir", actor, potion.category());
        Ok(text)
    }

    /// Describes a live entity by tag.
    pub fn describe_tag(&self, tag: &str) -> RuleResult<String> {
        if !self.field_tags.contains(tag) {
            return Err(RuleViolation::InvalidTarget(
                "The tag is incorrect. Try requesting information about another tag.".to_string(),
            ));
        }
        self.entity_by_tag(tag).map(Informable::info).ok_or_else(|| {
            RuleViolation::InvalidTarget(format!("Nothing is registered under the tag '{}'.", tag))
        })
    }

    /// Descriptions of the enemies guarding a cell, one bullet per enemy.
    pub(crate) fn describe_protectors(&self, position: Position) -> Vec<String> {
        self.board
            .cell_at(position)
            .map(|cell| {
                cell.protectors()
                    .iter()
                    .filter_map(|id| self.entities.get(id))
                    .map(|enemy| format!("* {}", enemy.info()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Describes a cell: its guards, its occupant, or that it is empty.
    pub fn describe_cell(&self, position: Position) -> RuleResult<String> {
        let cell = self.board.cell_at(position)?;

        let data = if cell.is_protected() {
            let guards: Vec<String> = cell
                .protectors()
                .iter()
                .filter_map(|id| self.entities.get(id))
                .map(Informable::info)
                .collect();
            if guards.len() == 1 {
                format!("This cell is guarded by an enemy.\n{}", guards[0])
            } else {
                format!("This cell is guarded by enemies.\n{}", guards.join("\n"))
            }
        } else if let Some(occupant) = cell.occupant() {
            let description = self
                .entities
                .get(&occupant.id)
                .map(Informable::info)
                .unwrap_or_default();
            match occupant.kind {
                OccupantKind::Chest => {
                    "This cell is occupied. There is a treasure chest in this cell.".to_string()
                }
                OccupantKind::Character => format!(
                    "This cell is occupied. One of your characters stands here.\n{}",
                    description
                ),
                OccupantKind::Enemy => {
                    format!("This cell is occupied. An enemy stands here.\n{}", description)
                }
            }
        } else {
            "The cell is empty.".to_string()
        };

        Ok(format!("Cell ({},{}):\n{}", position.x, position.y, data))
    }

    /// Textual board view.
    pub fn render_board(&self) -> String {
        self.board.render()
    }
}

fn actor_unavailable() -> RuleViolation {
    RuleViolation::ActorUnavailable("This character is no longer in the game.".to_string())
}
