//! # Entities
//!
//! Playable characters, enemies and treasure chests.
//!
//! Instead of a class hierarchy every entity kind implements the capability traits it
//! actually has: all entities are [`Positioned`], [`Taggable`] and [`Informable`];
//! playable characters are also [`Movable`], and [`Flyable`] reports whether a given
//! character has wings.

use crate::utils::math::scale;
use crate::{
    EntityId, Flyable, Informable, ItemKind, Movable, OccupantKind, Position, Positioned, Stat,
    Tag, Taggable, BOSS_TAG, CHEST_TAG, ENEMY_TAG_PREFIX,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default character stats before class multipliers.
pub const BASE_HEALTH: i32 = 200;
pub const BASE_ENERGY: i32 = 100;
pub const BASE_RANGE: i32 = 1;
pub const BASE_CLOSE_ATTACK: i32 = 70;
pub const BASE_RANGED_ATTACK: i32 = 50;
pub const BASE_ATTACK_ENERGY_COST: i32 = 5;
pub const BASE_MOVE_ENERGY_COST: i32 = 1;

/// The four playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Archer,
    Mage,
    Fairy,
}

impl CharacterClass {
    pub const ALL: [CharacterClass; 4] = [
        CharacterClass::Fairy,
        CharacterClass::Archer,
        CharacterClass::Mage,
        CharacterClass::Warrior,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Archer => "Archer",
            CharacterClass::Mage => "Mage",
            CharacterClass::Fairy => "Fairy",
        }
    }

    /// First letter of the class name, used as the character's tag.
    pub fn tag(self) -> Tag {
        self.name()[..1].to_lowercase()
    }

    /// Looks up a class by its tag.
    pub fn from_tag(tag: &str) -> Option<CharacterClass> {
        Self::ALL.into_iter().find(|class| class.tag() == tag)
    }

    /// Only fairies have wings.
    pub fn can_fly(self) -> bool {
        self == CharacterClass::Fairy
    }

    /// Warriors cannot attack from a distance.
    pub fn can_shoot(self) -> bool {
        self != CharacterClass::Warrior
    }

    /// Multipliers applied to the base stats, in [`Stat::ALL`] order.
    fn multipliers(self) -> [f64; 7] {
        match self {
            CharacterClass::Warrior => [1.0, 0.5, 1.0, 1.0, 0.0, 1.0, 1.0],
            CharacterClass::Archer => [0.5, 0.5, 3.0, 0.5, 2.0, 1.0, 1.0],
            CharacterClass::Mage => [0.5, 2.0, 2.0, 0.2, 2.0, 1.0, 1.0],
            CharacterClass::Fairy => [0.2, 1.0, 2.0, 0.0, 1.0, 1.0, 0.5],
        }
    }

    /// Starting stats of a freshly created character of this class.
    pub fn base_stats(self) -> StatBlock {
        let [health, energy, range, close, ranged, aec, mec] = self.multipliers();
        StatBlock {
            health: scale(BASE_HEALTH, health),
            energy: scale(BASE_ENERGY, energy),
            range: scale(BASE_RANGE, range),
            close_attack: scale(BASE_CLOSE_ATTACK, close),
            ranged_attack: scale(BASE_RANGED_ATTACK, ranged),
            attack_energy_cost: scale(BASE_ATTACK_ENERGY_COST, aec),
            move_energy_cost: scale(BASE_MOVE_ENERGY_COST, mec),
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full stat sheet of a playable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub health: i32,
    pub energy: i32,
    pub range: i32,
    pub close_attack: i32,
    pub ranged_attack: i32,
    pub attack_energy_cost: i32,
    pub move_energy_cost: i32,
}

impl StatBlock {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Health => self.health,
            Stat::Energy => self.energy,
            Stat::Range => self.range,
            Stat::CloseAttack => self.close_attack,
            Stat::RangedAttack => self.ranged_attack,
            Stat::AttackEnergyCost => self.attack_energy_cost,
            Stat::MoveEnergyCost => self.move_energy_cost,
        }
    }

    /// Adds a signed delta to one stat.
    pub fn adjust(&mut self, stat: Stat, delta: i32) {
        let slot = match stat {
            Stat::Health => &mut self.health,
            Stat::Energy => &mut self.energy,
            Stat::Range => &mut self.range,
            Stat::CloseAttack => &mut self.close_attack,
            Stat::RangedAttack => &mut self.ranged_attack,
            Stat::AttackEnergyCost => &mut self.attack_energy_cost,
            Stat::MoveEnergyCost => &mut self.move_energy_cost,
        };
        *slot = slot.saturating_add(delta);
    }
}

/// Core trait for everything that lives on the board.
pub trait Entity: Positioned + Taggable + Informable {
    fn id(&self) -> EntityId;

    fn occupant_kind(&self) -> OccupantKind;
}

/// A player-controlled character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayableCharacter {
    pub id: EntityId,
    pub class: CharacterClass,
    pub position: Position,
    pub stats: StatBlock,
    /// Energy per flight; `None` for classes without wings
    pub flight_cost: Option<i32>,
}

impl PlayableCharacter {
    /// Creates a character with its class's starting stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{CharacterClass, EntityId, PlayableCharacter, Position, Taggable};
    ///
    /// let warrior = PlayableCharacter::new(EntityId(1), CharacterClass::Warrior, Position::new(2, 2), 5);
    /// assert_eq!(warrior.tag(), "w");
    /// assert_eq!(warrior.stats.close_attack, 70);
    /// assert!(warrior.flight_cost.is_none());
    /// ```
    pub fn new(id: EntityId, class: CharacterClass, position: Position, fly_energy_cost: i32) -> Self {
        Self {
            id,
            class,
            position,
            stats: class.base_stats(),
            flight_cost: class.can_fly().then_some(fly_energy_cost),
        }
    }

    pub fn name(&self) -> &'static str {
        self.class.name()
    }

    pub fn is_alive(&self) -> bool {
        self.stats.health > 0
    }

    /// Takes damage and reports whether the character is still standing.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.stats.health = self.stats.health.saturating_sub(damage);
        self.is_alive()
    }
}

impl Positioned for PlayableCharacter {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

impl Taggable for PlayableCharacter {
    fn tag(&self) -> Tag {
        self.class.tag()
    }
}

impl Informable for PlayableCharacter {
    fn info(&self) -> String {
        let stats: Vec<String> = Stat::ALL
            .iter()
            .map(|&stat| format!("\"{}\" {}", stat.display_name(), self.stats.get(stat)))
            .collect();

        format!(
            "Your character, class \"{}\". Stats: {}. Located at {}.",
            self.name(),
            stats.join(", "),
            self.position
        )
    }
}

impl Movable for PlayableCharacter {
    fn energy(&self) -> i32 {
        self.stats.energy
    }

    fn move_energy_cost(&self) -> i32 {
        self.stats.move_energy_cost
    }

    fn spend_energy(&mut self, amount: i32) {
        self.stats.energy -= amount;
    }
}

impl Flyable for PlayableCharacter {
    fn flight_cost(&self) -> Option<i32> {
        self.flight_cost
    }
}

impl Entity for PlayableCharacter {
    fn id(&self) -> EntityId {
        self.id
    }

    fn occupant_kind(&self) -> OccupantKind {
        OccupantKind::Character
    }
}

/// Rolled combat profile of an enemy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyProfile {
    pub name: String,
    pub health: i32,
    pub close_attack: i32,
    pub ranged_attack: i32,
}

/// A stationary hostile entity, optionally guarding cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    /// Per-session enemy number shown to the player
    pub number: u32,
    pub name: String,
    pub position: Position,
    pub health: i32,
    pub close_attack: i32,
    pub ranged_attack: i32,
    pub is_boss: bool,
    pub protected_cells: Vec<Position>,
}

impl Enemy {
    pub fn new(
        id: EntityId,
        number: u32,
        profile: EnemyProfile,
        position: Position,
        is_boss: bool,
    ) -> Self {
        Self {
            id,
            number,
            name: profile.name,
            position,
            health: profile.health,
            close_attack: profile.close_attack,
            ranged_attack: profile.ranged_attack,
            is_boss,
            protected_cells: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Takes damage and reports whether the enemy is still standing.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        self.health = self.health.saturating_sub(damage);
        self.is_alive()
    }

    /// Records a guarded cell once.
    pub fn add_protected_cell(&mut self, position: Position) {
        if !self.protected_cells.contains(&position) {
            self.protected_cells.push(position);
        }
    }
}

impl Positioned for Enemy {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

impl Taggable for Enemy {
    fn tag(&self) -> Tag {
        if self.is_boss {
            BOSS_TAG.to_string()
        } else {
            format!("{}{}", ENEMY_TAG_PREFIX, self.number)
        }
    }
}

impl Informable for Enemy {
    fn info(&self) -> String {
        format!(
            "Enemy #{}. Name: \"{}\". Stats: {} {}, {} {}, {} {}. Located at {}.",
            self.number,
            self.name,
            Stat::Health.display_name(),
            self.health,
            Stat::CloseAttack.display_name(),
            self.close_attack,
            Stat::RangedAttack.display_name(),
            self.ranged_attack,
            self.position
        )
    }
}

impl Entity for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn occupant_kind(&self) -> OccupantKind {
        OccupantKind::Enemy
    }
}

/// A closed chest holding one random item from its content pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasureChest {
    pub id: EntityId,
    pub position: Position,
    pub contents: Vec<ItemKind>,
}

impl TreasureChest {
    pub fn new(id: EntityId, position: Position) -> Self {
        Self {
            id,
            position,
            contents: ItemKind::ALL.to_vec(),
        }
    }
}

impl Positioned for TreasureChest {
    fn position(&self) -> Position {
        self.position
    }

    fn set_position(&mut self, position: Position) {
        self.position = position;
    }
}

impl Taggable for TreasureChest {
    fn tag(&self) -> Tag {
        CHEST_TAG.to_string()
    }
}

impl Informable for TreasureChest {
    fn info(&self) -> String {
        format!(
            "Treasure chest at {}.\nOpen the chest to find out what is inside.",
            self.position
        )
    }
}

impl Entity for TreasureChest {
    fn id(&self) -> EntityId {
        self.id
    }

    fn occupant_kind(&self) -> OccupantKind {
        OccupantKind::Chest
    }
}

/// Concrete entity stored in the session's registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConcreteEntity {
    Character(PlayableCharacter),
    Enemy(Enemy),
    Chest(TreasureChest),
}

impl ConcreteEntity {
    pub fn as_character(&self) -> Option<&PlayableCharacter> {
        match self {
            ConcreteEntity::Character(character) => Some(character),
            _ => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut PlayableCharacter> {
        match self {
            ConcreteEntity::Character(character) => Some(character),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&Enemy> {
        match self {
            ConcreteEntity::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut Enemy> {
        match self {
            ConcreteEntity::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn as_chest(&self) -> Option<&TreasureChest> {
        match self {
            ConcreteEntity::Chest(chest) => Some(chest),
            _ => None,
        }
    }

    fn as_entity(&self) -> &dyn Entity {
        match self {
            ConcreteEntity::Character(character) => character,
            ConcreteEntity::Enemy(enemy) => enemy,
            ConcreteEntity::Chest(chest) => chest,
        }
    }
}

impl Positioned for ConcreteEntity {
    fn position(&self) -> Position {
        self.as_entity().position()
    }

    fn set_position(&mut self, position: Position) {
        match self {
            ConcreteEntity::Character(character) => character.set_position(position),
            ConcreteEntity::Enemy(enemy) => enemy.set_position(position),
            ConcreteEntity::Chest(chest) => chest.set_position(position),
        }
    }
}

impl Taggable for ConcreteEntity {
    fn tag(&self) -> Tag {
        self.as_entity().tag()
    }
}

impl Informable for ConcreteEntity {
    fn info(&self) -> String {
        self.as_entity().info()
    }
}

impl Entity for ConcreteEntity {
    fn id(&self) -> EntityId {
        self.as_entity().id()
    }

    fn occupant_kind(&self) -> OccupantKind {
        self.as_entity().occupant_kind()
    }
}

impl From<PlayableCharacter> for ConcreteEntity {
    fn from(character: PlayableCharacter) -> Self {
        ConcreteEntity::Character(character)
    }
}

impl From<Enemy> for ConcreteEntity {
    fn from(enemy: Enemy) -> Self {
        ConcreteEntity::Enemy(enemy)
    }
}

impl From<TreasureChest> for ConcreteEntity {
    fn from(chest: TreasureChest) -> Self {
        ConcreteEntity::Chest(chest)
    }
}
