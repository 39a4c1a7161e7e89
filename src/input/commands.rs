//! # Command Records
//!
//! Typed records produced by the command parser and the argument plans built from them.

use crate::{Position, PotionKind, RuleResult, RuleViolation, Tag, Target};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actions a playable character can be ordered to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionName {
    Move,
    Fly,
    Attack,
    Shoot,
    Use,
}

impl ActionName {
    pub const ALL: [ActionName; 5] = [
        ActionName::Move,
        ActionName::Fly,
        ActionName::Attack,
        ActionName::Shoot,
        ActionName::Use,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActionName::Move => "move",
            ActionName::Fly => "fly",
            ActionName::Attack => "attack",
            ActionName::Shoot => "shoot",
            ActionName::Use => "use",
        }
    }

    /// Looks up an action by its lowercase name.
    pub fn from_name(name: &str) -> Option<ActionName> {
        Self::ALL.into_iter().find(|action| action.name() == name)
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `<tag>.<action>(<args>)` as typed by the player.
///
/// Arguments stay raw so that `repeat` can replay the command verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCommand {
    pub tag: Tag,
    pub action: ActionName,
    pub args: Vec<String>,
}

/// An action command with its arguments checked and typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPlan {
    Move(Position),
    Fly(Position),
    Attack(Target),
    Shoot(Target),
    Use(PotionKind),
}

fn parse_coordinate(raw: &str) -> RuleResult<i32> {
    raw.parse::<i32>().map_err(|_| {
        RuleViolation::InvalidArguments(format!("\"{}\" is not a valid coordinate.", raw))
    })
}

/// Parses two raw coordinates into a position.
pub fn parse_position(x: &str, y: &str) -> RuleResult<Position> {
    Ok(Position::new(parse_coordinate(x)?, parse_coordinate(y)?))
}

impl ActionCommand {
    pub fn new(tag: impl Into<Tag>, action: ActionName, args: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            action,
            args,
        }
    }

    /// Checks arity and argument types.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{ActionCommand, ActionName, ActionPlan, Position, Target};
    ///
    /// let command = ActionCommand::new("a", ActionName::Shoot, vec!["e2".to_string()]);
    /// assert_eq!(command.plan().unwrap(), ActionPlan::Shoot(Target::Tag("e2".to_string())));
    ///
    /// let command = ActionCommand::new("w", ActionName::Move, vec!["3".to_string(), "2".to_string()]);
    /// assert_eq!(command.plan().unwrap(), ActionPlan::Move(Position::new(3, 2)));
    /// ```
    pub fn plan(&self) -> RuleResult<ActionPlan> {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();

        match (self.action, args.as_slice()) {
            (ActionName::Move, [x, y]) => Ok(ActionPlan::Move(parse_position(x, y)?)),
            (ActionName::Fly, [x, y]) => Ok(ActionPlan::Fly(parse_position(x, y)?)),
            (ActionName::Attack, [tag]) => Ok(ActionPlan::Attack(Target::Tag(tag.to_string()))),
            (ActionName::Attack, [x, y]) => Ok(ActionPlan::Attack(Target::Cell(parse_position(x, y)?))),
            (ActionName::Shoot, [tag]) => Ok(ActionPlan::Shoot(Target::Tag(tag.to_string()))),
            (ActionName::Shoot, [x, y]) => Ok(ActionPlan::Shoot(Target::Cell(parse_position(x, y)?))),
            (ActionName::Use, [category]) => PotionKind::from_category(category)
                .map(ActionPlan::Use)
                .ok_or_else(|| {
                    RuleViolation::InvalidArguments(format!(
                        "Unknown item category \"{}\". Use health or energy.",
                        category
                    ))
                }),
            (action, _) => Err(RuleViolation::InvalidArguments(format!(
                "Wrong number of arguments for \"{}\": {}.",
                action,
                expected_arguments(action)
            ))),
        }
    }
}

fn expected_arguments(action: ActionName) -> &'static str {
    match action {
        ActionName::Move | ActionName::Fly => "expected two coordinates",
        ActionName::Attack | ActionName::Shoot => "expected an enemy tag or two coordinates",
        ActionName::Use => "expected one item category",
    }
}

impl fmt::Display for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.tag, self.action, self.args.join(","))
    }
}

/// A fully parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    PrintField,
    EndGame,
    Repeat,
    InfoTag(Tag),
    InfoInventory,
    InfoCell(Position),
    Action(ActionCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(tag: &str, action: ActionName, args: &[&str]) -> ActionCommand {
        ActionCommand::new(tag, action, args.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn test_action_names() {
        for action in ActionName::ALL {
            assert_eq!(ActionName::from_name(action.name()), Some(action));
        }
        assert_eq!(ActionName::from_name("jump"), None);
    }

    #[test]
    fn test_plan_arity_errors() {
        assert!(matches!(
            command("w", ActionName::Move, &["3"]).plan(),
            Err(RuleViolation::InvalidArguments(_))
        ));
        assert!(matches!(
            command("f", ActionName::Fly, &[]).plan(),
            Err(RuleViolation::InvalidArguments(_))
        ));
        assert!(matches!(
            command("w", ActionName::Attack, &["1", "2", "3"]).plan(),
            Err(RuleViolation::InvalidArguments(_))
        ));
        assert!(matches!(
            command("m", ActionName::Use, &["mana"]).plan(),
            Err(RuleViolation::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_plan_non_numeric_coordinates() {
        assert!(matches!(
            command("w", ActionName::Move, &["x", "2"]).plan(),
            Err(RuleViolation::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_plan_targets() {
        assert_eq!(
            command("w", ActionName::Attack, &["4", "5"]).plan(),
            Ok(ActionPlan::Attack(Target::Cell(Position::new(4, 5))))
        );
        assert_eq!(
            command("m", ActionName::Use, &["energy"]).plan(),
            Ok(ActionPlan::Use(PotionKind::Energy))
        );
    }

    #[test]
    fn test_display_matches_grammar() {
        assert_eq!(command("w", ActionName::Move, &["3", "2"]).to_string(), "w.move(3,2)");
        assert_eq!(command("a", ActionName::Shoot, &["b"]).to_string(), "a.shoot(b)");
    }
}
