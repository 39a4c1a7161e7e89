//! # Input Module
//!
//! Tokenizer and recursive-descent parser for the player's text commands.
//!
//! Grammar (case-insensitive, surrounding whitespace ignored):
//!
//! ```text
//! command  := keyword [ "(" ")" ]
//!           | "info" "(" arg [ "," arg ] ")"
//!           | word "." word "(" [ arg { "," arg } ] ")"
//! keyword  := "help" | "print_field" | "end_game" | "repeat"
//! ```

pub mod commands;

pub use commands::*;

use crate::{RuleResult, RuleViolation};

/// Lexical tokens of a command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),
    Dot,
    Comma,
    LeftParen,
    RightParen,
}

fn invalid_command() -> RuleViolation {
    RuleViolation::InvalidCommand(
        "Unknown command. Type \"help\" to see the list of commands.".to_string(),
    )
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '+'
}

/// Splits a lowercased command line into tokens.
///
/// # Examples
///
/// ```
/// use console_dungeon::{tokenize, Token};
///
/// let tokens = tokenize("W.Move(3, 2)").unwrap();
/// assert_eq!(tokens[0], Token::Word("w".to_string()));
/// assert_eq!(tokens.len(), 8);
/// ```
pub fn tokenize(input: &str) -> RuleResult<Vec<Token>> {
    let lowered = input.trim().to_lowercase();
    let mut tokens = Vec::new();
    let mut chars = lowered.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                tokens.push(Token::Dot);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LeftParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RightParen);
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            c if is_word_char(c) => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
            _ => return Err(invalid_command()),
        }
    }

    Ok(tokens)
}

/// Recursive-descent parser over a token stream.
pub struct CommandParser {
    tokens: Vec<Token>,
    position: usize,
}

impl CommandParser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token) -> RuleResult<()> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            _ => Err(invalid_command()),
        }
    }

    fn word(&mut self) -> RuleResult<String> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word),
            _ => Err(invalid_command()),
        }
    }

    fn finish(&self) -> RuleResult<()> {
        if self.position == self.tokens.len() {
            Ok(())
        } else {
            Err(invalid_command())
        }
    }

    /// `"(" [ arg { "," arg } ] ")"`
    fn arguments(&mut self) -> RuleResult<Vec<String>> {
        self.expect(Token::LeftParen)?;
        let mut args = Vec::new();

        if self.peek() == Some(&Token::RightParen) {
            self.next();
            return Ok(args);
        }

        loop {
            args.push(self.word()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RightParen) => break,
                _ => return Err(invalid_command()),
            }
        }

        Ok(args)
    }

    /// Keyword commands accept an optional empty argument list.
    fn keyword(&mut self, command: Command) -> RuleResult<Command> {
        if self.peek().is_some() && !self.arguments()?.is_empty() {
            return Err(invalid_command());
        }
        self.finish()?;
        Ok(command)
    }

    fn info(&mut self) -> RuleResult<Command> {
        let args = self.arguments()?;
        self.finish()?;

        match args.as_slice() {
            [target] if target == "inv" => Ok(Command::InfoInventory),
            [tag] => Ok(Command::InfoTag(tag.clone())),
            [x, y] => Ok(Command::InfoCell(parse_position(x, y)?)),
            _ => Err(RuleViolation::InvalidArguments(
                "Use info(<tag>), info(inv) or info(<x>,<y>).".to_string(),
            )),
        }
    }

    fn action(&mut self, tag: String) -> RuleResult<Command> {
        self.expect(Token::Dot)?;
        let name = self.word()?;
        let action = ActionName::from_name(&name).ok_or_else(invalid_command)?;
        let args = self.arguments()?;
        self.finish()?;

        Ok(Command::Action(ActionCommand::new(tag, action, args)))
    }

    /// Parses the whole token stream into one command.
    pub fn parse(&mut self) -> RuleResult<Command> {
        let head = self.word()?;

        match head.as_str() {
            "help" => self.keyword(Command::Help),
            "print_field" => self.keyword(Command::PrintField),
            "end_game" => self.keyword(Command::EndGame),
            "repeat" => self.keyword(Command::Repeat),
            "info" if self.peek() == Some(&Token::LeftParen) => self.info(),
            _ if self.peek() == Some(&Token::Dot) => self.action(head),
            _ => Err(invalid_command()),
        }
    }
}

/// Parses one command line.
///
/// # Examples
///
/// ```
/// use console_dungeon::{parse_command, ActionName, Command, Position};
///
/// assert_eq!(parse_command("  HELP ").unwrap(), Command::Help);
/// assert_eq!(parse_command("info(3,4)").unwrap(), Command::InfoCell(Position::new(3, 4)));
///
/// match parse_command("w.move(3,2)").unwrap() {
///     Command::Action(action) => assert_eq!(action.action, ActionName::Move),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn parse_command(input: &str) -> RuleResult<Command> {
    CommandParser::new(tokenize(input)?).parse()
}
