//! # Combat Resolver
//!
//! Melee and ranged exchanges between a playable character and an enemy.
//!
//! The attacker strikes first. A surviving enemy always strikes back; either side
//! reaching zero health is removed from the board together with its tag.

use crate::{
    ConcreteEntity, EntityId, GameState, OccupantKind, Position, RetaliationStat, RuleResult,
    RuleViolation, Tag,
};
use log::debug;

/// Who an attack is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An entity addressed by its tag
    Tag(Tag),
    /// Whatever stands in the given cell
    Cell(Position),
}

/// Melee or ranged exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackKind {
    Melee,
    Ranged,
}

impl GameState {
    /// Melee attack against an adjacent enemy (diagonals included).
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{CharacterClass, EnemyProfile, GameState, Position, Rules};
    /// use console_dungeon::game::combat::Target;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut state = GameState::new(8, 8, Rules::default(), StdRng::seed_from_u64(5));
    /// let warrior = state.spawn_character(CharacterClass::Warrior, Position::new(2, 2)).unwrap();
    /// let profile = EnemyProfile {
    ///     name: "Goblin Warrior".to_string(),
    ///     health: 50,
    ///     close_attack: 30,
    ///     ranged_attack: 10,
    /// };
    /// state.spawn_enemy(profile, Position::new(3, 3), &[], false).unwrap();
    ///
    /// state.attack(warrior, &Target::Tag("e1".to_string())).unwrap();
    /// assert!(state.enemy("e1").is_none());
    /// assert_eq!(state.score(), 100);
    /// ```
    pub fn attack(&mut self, actor: EntityId, target: &Target) -> RuleResult<String> {
        self.fight(actor, target, AttackKind::Melee)
    }

    /// Ranged attack against an enemy within the attacker's range.
    pub fn shoot(&mut self, actor: EntityId, target: &Target) -> RuleResult<String> {
        self.fight(actor, target, AttackKind::Ranged)
    }

    /// Resolves a target to the id of a live enemy.
    fn resolve_enemy(&self, target: &Target) -> RuleResult<EntityId> {
        let (id, kind) = match target {
            Target::Tag(tag) => {
                let id = self
                    .id_of(tag)
                    .ok_or_else(|| RuleViolation::InvalidTarget("Incorrect tag!".to_string()))?;
                let kind = match self.entity(id) {
                    Some(ConcreteEntity::Character(_)) => OccupantKind::Character,
                    Some(ConcreteEntity::Enemy(_)) => OccupantKind::Enemy,
                    Some(ConcreteEntity::Chest(_)) => OccupantKind::Chest,
                    None => {
                        return Err(RuleViolation::InvalidTarget("Incorrect tag!".to_string()))
                    }
                };
                (id, kind)
            }
            Target::Cell(position) => {
                let cell = self.board().cell_at(*position)?;
                let occupant = cell.occupant().ok_or_else(|| {
                    RuleViolation::InvalidTarget("There is no enemy in the selected cell!".to_string())
                })?;
                (occupant.id, occupant.kind)
            }
        };

        match kind {
            OccupantKind::Enemy => Ok(id),
            OccupantKind::Character => Err(RuleViolation::InvalidTarget(
                "You cannot attack a friendly character!".to_string(),
            )),
            OccupantKind::Chest => Err(RuleViolation::InvalidTarget(
                "You can only attack enemies!".to_string(),
            )),
        }
    }

    fn fight(&mut self, actor: EntityId, target: &Target, kind: AttackKind) -> RuleResult<String> {
        let attacker = self.acting_character(actor)?;
        let name = attacker.name();

        if kind == AttackKind::Ranged && !attacker.class.can_shoot() {
            return Err(RuleViolation::UnsupportedAction(format!(
                "{} cannot attack from a distance.",
                name
            )));
        }

        let (reach, damage) = match kind {
            AttackKind::Melee => (1, attacker.stats.close_attack),
            AttackKind::Ranged => (attacker.stats.range, attacker.stats.ranged_attack),
        };
        let attacker_position = attacker.position;

        let enemy_id = self.resolve_enemy(target)?;
        let enemy = self
            .entity(enemy_id)
            .and_then(ConcreteEntity::as_enemy)
            .ok_or_else(|| RuleViolation::InvalidTarget("You can only attack enemies!".to_string()))?;

        if attacker_position.chebyshev_distance(enemy.position) > reach {
            return Err(RuleViolation::TargetOutOfRange(
                "The enemy is too far away!".to_string(),
            ));
        }

        let enemy_name = enemy.name.clone();
        let counter = match (self.rules().retaliation, kind) {
            (RetaliationStat::Matching, AttackKind::Ranged) => enemy.ranged_attack,
            _ => enemy.close_attack,
        };

        let mut narrative = format!(
            "The fight between \"{}\" and \"{}\" has begun!",
            name, enemy_name
        );
        if kind == AttackKind::Ranged {
            narrative.push_str(&format!("\n\"{}\" shoots at the enemy!", name));
        }

        let survived = match self
            .entity_mut(enemy_id)
            .and_then(ConcreteEntity::as_enemy_mut)
        {
            Some(enemy) => {
                let survived = enemy.take_damage(damage);
                if survived {
                    narrative.push_str(&format!(
                        "\nEnemy \"{}\" took {} damage. Health left: {}.",
                        enemy_name, damage, enemy.health
                    ));
                } else {
                    narrative.push_str(&format!(
                        "\nEnemy \"{}\" took {} damage. \"{}\" was defeated.",
                        enemy_name, damage, enemy_name
                    ));
                }
                survived
            }
            None => false,
        };
        self.statistics_mut().damage_dealt += damage.max(0) as u64;

        if !survived {
            self.destroy_enemy(enemy_id);
            debug!("{} defeated {} with {:?}", name, enemy_name, kind);
            return Ok(narrative);
        }

        narrative.push_str(&format!("\n\"{}\" strikes back!", enemy_name));
        let standing = match self
            .entity_mut(actor)
            .and_then(ConcreteEntity::as_character_mut)
        {
            Some(character) => {
                let standing = character.take_damage(counter);
                narrative.push_str(&format!(
                    "\nCharacter \"{}\" took {} damage! Health left: {}.",
                    name, counter, character.stats.health
                ));
                standing
            }
            None => true,
        };
        self.statistics_mut().damage_taken += counter.max(0) as u64;

        if !standing {
            if let Some(line) = self.destroy_character(actor) {
                narrative.push('\n');
                narrative.push_str(&line);
            }
        }

        debug!(
            "{} hit {} for {} and took {} back",
            name, enemy_name, damage, counter
        );
        Ok(narrative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CharacterClass, DungeonResult, EnemyProfile, Rules};
    use rand::{rngs::StdRng, SeedableRng};

    fn profile(health: i32, close_attack: i32, ranged_attack: i32) -> EnemyProfile {
        EnemyProfile {
            name: "Ogre Warrior".to_string(),
            health,
            close_attack,
            ranged_attack,
        }
    }

    fn state_with(rules: Rules) -> GameState {
        GameState::new(8, 8, rules, StdRng::seed_from_u64(21))
    }

    #[test]
    fn test_kill_awards_score_without_retaliation() -> DungeonResult<()> {
        let mut state = state_with(Rules::default());
        let warrior = state.spawn_character(CharacterClass::Warrior, Position::new(2, 2))?;
        state.spawn_enemy(profile(50, 40, 10), Position::new(2, 3), &[Position::new(3, 3)], false)?;

        let text = state.attack(warrior, &Target::Cell(Position::new(2, 3)))?;
        assert!(text.contains("was defeated"));
        assert!(!text.contains("strikes back"));
        assert_eq!(state.score(), 100);
        assert_eq!(state.character("w").unwrap().stats.health, 200);
        assert!(!state.tags().contains("e1"));
        assert!(!state.board().cell_at(Position::new(3, 3)).unwrap().is_protected());
        assert!(state.board().cell_at(Position::new(2, 3)).unwrap().is_free());
        Ok(())
    }

    #[test]
    fn test_survivor_retaliates_with_close_attack() -> DungeonResult<()> {
        let mut state = state_with(Rules::default());
        let archer = state.spawn_character(CharacterClass::Archer, Position::new(2, 1))?;
        state.spawn_enemy(profile(300, 40, 70), Position::new(4, 3), &[], false)?;

        let text = state.shoot(archer, &Target::Tag("e1".to_string()))?;
        assert!(text.contains("shoots at the enemy"));
        assert_eq!(state.enemy("e1").unwrap().health, 200);
        assert_eq!(state.character("a").unwrap().stats.health, 60);
        assert_eq!(state.statistics().damage_taken, 40);
        Ok(())
    }

    #[test]
    fn test_matching_retaliation_uses_ranged_attack() -> DungeonResult<()> {
        let rules = Rules {
            retaliation: RetaliationStat::Matching,
            ..Rules::default()
        };
        let mut state = state_with(rules);
        let archer = state.spawn_character(CharacterClass::Archer, Position::new(2, 1))?;
        state.spawn_enemy(profile(300, 40, 70), Position::new(4, 3), &[], false)?;

        state.shoot(archer, &Target::Tag("e1".to_string()))?;
        assert_eq!(state.character("a").unwrap().stats.health, 30);
        Ok(())
    }

    #[test]
    fn test_attacker_dies_from_retaliation() -> DungeonResult<()> {
        let mut state = state_with(Rules::default());
        let fairy = state.spawn_character(CharacterClass::Fairy, Position::new(1, 1))?;
        state.spawn_enemy(profile(500, 100, 10), Position::new(2, 2), &[], false)?;

        let text = state.attack(fairy, &Target::Tag("e1".to_string()))?;
        assert!(text.ends_with("Your character \"Fairy\" has fallen!"));
        assert!(state.friendly_tags().is_empty());
        assert_eq!(state.score(), -100);
        assert!(state.board().cell_at(Position::new(1, 1)).unwrap().is_free());
        Ok(())
    }

    #[test]
    fn test_range_and_target_validation() -> DungeonResult<()> {
        let mut state = state_with(Rules::default());
        let warrior = state.spawn_character(CharacterClass::Warrior, Position::new(2, 2))?;
        state.spawn_character(CharacterClass::Mage, Position::new(1, 2))?;
        state.spawn_chest(Position::new(3, 2))?;
        state.spawn_enemy(profile(50, 10, 10), Position::new(4, 4), &[], false)?;

        assert!(matches!(
            state.attack(warrior, &Target::Tag("e1".to_string())),
            Err(RuleViolation::TargetOutOfRange(_))
        ));
        assert!(matches!(
            state.attack(warrior, &Target::Tag("m".to_string())),
            Err(RuleViolation::InvalidTarget(_))
        ));
        assert!(matches!(
            state.attack(warrior, &Target::Cell(Position::new(3, 2))),
            Err(RuleViolation::InvalidTarget(_))
        ));
        assert!(matches!(
            state.attack(warrior, &Target::Cell(Position::new(2, 3))),
            Err(RuleViolation::InvalidTarget(_))
        ));
        assert!(matches!(
            state.attack(warrior, &Target::Cell(Position::new(9, 9))),
            Err(RuleViolation::OutOfBounds(_))
        ));
        assert!(matches!(
            state.shoot(warrior, &Target::Tag("e1".to_string())),
            Err(RuleViolation::UnsupportedAction(_))
        ));
        assert_eq!(state.enemy("e1").unwrap().health, 50);
        Ok(())
    }

    #[test]
    fn test_last_protector_releases_cell() -> DungeonResult<()> {
        let mut state = state_with(Rules::default());
        let warrior = state.spawn_character(CharacterClass::Warrior, Position::new(2, 2))?;
        let guarded = Position::new(5, 5);
        state.spawn_enemy(profile(10, 5, 5), Position::new(3, 3), &[guarded], false)?;
        state.spawn_enemy(profile(10, 5, 5), Position::new(2, 3), &[guarded], false)?;

        state.attack(warrior, &Target::Tag("e1".to_string()))?;
        assert!(state.board().cell_at(guarded).unwrap().is_protected());

        state.attack(warrior, &Target::Tag("e2".to_string()))?;
        assert!(!state.board().cell_at(guarded).unwrap().is_protected());
        assert_eq!(state.statistics().enemies_defeated, 2);
        Ok(())
    }
}
