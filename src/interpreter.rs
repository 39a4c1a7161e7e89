//! # Command Interpreter
//!
//! The per-session state machine that turns command lines into rule calls.
//!
//! In [`InterpreterState::Idle`] every grammar command is accepted. `end_game` moves
//! the machine to [`InterpreterState::AwaitingEndConfirmation`], where only a yes/no
//! answer is understood. After every successful command the end conditions are
//! re-evaluated and their message is appended to the response.

use crate::rendering::help_text;
use crate::{
    parse_command, ActionCommand, ActionPlan, Command, GameOutcome, GameState, RuleResult,
    RuleViolation,
};
use log::debug;

const CONFIRMATION_PROMPT: &str = "Are you sure you want to end the game? (yes/no)";
const CONTINUE_MESSAGE: &str = "The game continues.";
const REPROMPT: &str = "Please answer yes or no.";

const YES_ANSWERS: [&str; 2] = ["yes", "да"];
const NO_ANSWERS: [&str; 3] = ["no", "not", "нет"];

/// Represents the current state of the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    /// Regular command entry
    Idle,
    /// `end_game` was issued and a yes/no answer is expected
    AwaitingEndConfirmation,
}

/// Command state machine of one session.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    state: InterpreterState,
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandInterpreter {
    pub fn new() -> Self {
        Self {
            state: InterpreterState::Idle,
        }
    }

    pub fn state(&self) -> InterpreterState {
        self.state
    }

    /// Handles one command line against the game.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{generate_dungeon, CommandInterpreter, GenerationConfig, InterpreterState};
    ///
    /// let mut game = generate_dungeon(&GenerationConfig::for_testing(1)).unwrap().state;
    /// let mut interpreter = CommandInterpreter::new();
    ///
    /// interpreter.handle(&mut game, "end_game").unwrap();
    /// assert_eq!(interpreter.state(), InterpreterState::AwaitingEndConfirmation);
    /// interpreter.handle(&mut game, "no").unwrap();
    /// assert_eq!(interpreter.state(), InterpreterState::Idle);
    /// assert!(game.is_running());
    /// ```
    pub fn handle(&mut self, game: &mut GameState, line: &str) -> RuleResult<String> {
        if !game.is_running() {
            return Err(RuleViolation::InvalidCommand("The game is over.".to_string()));
        }

        let mut response = match self.state {
            InterpreterState::Idle => self.handle_idle(game, line)?,
            InterpreterState::AwaitingEndConfirmation => self.handle_confirmation(game, line),
        };

        if let Some(message) = game.check_end_conditions() {
            response.push('\n');
            response.push_str(&message);
        }

        Ok(response)
    }

    fn handle_idle(&mut self, game: &mut GameState, line: &str) -> RuleResult<String> {
        match parse_command(line)? {
            Command::Help => Ok(help_text()),
            Command::PrintField => Ok(game.render_board()),
            Command::EndGame => {
                self.state = InterpreterState::AwaitingEndConfirmation;
                Ok(CONFIRMATION_PROMPT.to_string())
            }
            Command::Repeat => {
                let last = game.history().last().cloned().ok_or_else(|| {
                    RuleViolation::NoHistory("There is no action to repeat yet.".to_string())
                })?;
                if !game.is_friendly(&last.tag) {
                    return Err(RuleViolation::ActorUnavailable(format!(
                        "The character \"{}\" from the last action is no longer in the game.",
                        last.tag
                    )));
                }
                execute_action(game, last)
            }
            Command::InfoTag(tag) => game.describe_tag(&tag),
            Command::InfoInventory => Ok(game.inventory().info()),
            Command::InfoCell(position) => game.describe_cell(position),
            Command::Action(action) => {
                if !game.is_friendly(&action.tag) {
                    return Err(RuleViolation::NotControllable(format!(
                        "\"{}\" is not one of your characters.",
                        action.tag
                    )));
                }
                execute_action(game, action)
            }
        }
    }

    fn handle_confirmation(&mut self, game: &mut GameState, line: &str) -> String {
        let answer = line.trim().to_lowercase();

        if YES_ANSWERS.contains(&answer.as_str()) {
            self.state = InterpreterState::Idle;
            game.finish(GameOutcome::Abandoned)
        } else if NO_ANSWERS.contains(&answer.as_str()) {
            self.state = InterpreterState::Idle;
            CONTINUE_MESSAGE.to_string()
        } else {
            REPROMPT.to_string()
        }
    }
}

/// Runs a validated action for a friendly character and records it.
fn execute_action(game: &mut GameState, command: ActionCommand) -> RuleResult<String> {
    let actor = game.id_of(&command.tag).ok_or_else(|| {
        RuleViolation::ActorUnavailable(format!(
            "The character \"{}\" is no longer in the game.",
            command.tag
        ))
    })?;

    let text = match command.plan()? {
        ActionPlan::Move(destination) => game.move_character(actor, destination)?,
        ActionPlan::Fly(destination) => game.fly_character(actor, destination)?,
        ActionPlan::Attack(target) => game.attack(actor, &target)?,
        ActionPlan::Shoot(target) => game.shoot(actor, &target)?,
        ActionPlan::Use(potion) => game.use_potion(actor, potion)?,
    };

    debug!("executed {}", command);
    game.record_action(command);
    Ok(text)
}
