//! # Console Dungeon
//!
//! A turn-based, grid-bound dungeon crawler engine driven by short text commands.
//!
//! ## Architecture Overview
//!
//! The engine is built as a small rule-based state machine around a handful of
//! concepts:
//!
//! - **Game State**: the board, the entity registry, the backpack and the score of one session
//! - **Entity Model**: playable characters, enemies and treasure chests with capability traits
//! - **Resolvers**: movement, combat and item use, each validating before it mutates
//! - **Generation**: the fixed dungeon layout plus seeded stat and loot rolls
//! - **Input**: an explicit command grammar producing typed command records
//! - **Interpreter**: the command state machine with its end-game confirmation
//!
//! Sessions are fully independent. Infrastructure around them (session registry,
//! audit log, id generation, console and TCP transports) lives in [`registry`],
//! [`audit`] and [`transport`].

pub mod audit;
pub mod game;
pub mod generation;
pub mod input;
pub mod interpreter;
pub mod registry;
pub mod rendering;
pub mod session;
pub mod transport;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;

pub use audit::{AuditLog, AuditRecord, IdGenerator, JsonLinesAuditLog, LogAuditLog, MemoryAuditLog,
    SequentialIdGenerator, UuidIdGenerator};
pub use interpreter::{CommandInterpreter, InterpreterState};
pub use registry::{RegistryConfig, SessionRegistry};
pub use session::{CommandResponse, GameSession, SessionId, SessionStatus};

/// Recoverable rule violations.
///
/// Every variant carries the narrative message shown to the player. A command that
/// fails with one of these leaves the session running and untouched.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("{0}")]
    OutOfBounds(String),

    #[error("{0}")]
    InsufficientEnergy(String),

    #[error("{0}")]
    CellBlocked(String),

    #[error("{0}")]
    CellDefended(String),

    #[error("{0}")]
    InvalidTarget(String),

    #[error("{0}")]
    TargetOutOfRange(String),

    #[error("{0}")]
    NoSuchItem(String),

    #[error("{0}")]
    ClassMismatch(String),

    #[error("{0}")]
    InvalidCommand(String),

    #[error("{0}")]
    NoHistory(String),

    #[error("{0}")]
    ActorUnavailable(String),

    #[error("{0}")]
    NotControllable(String),

    #[error("{0}")]
    InvalidArguments(String),

    #[error("{0}")]
    UnsupportedAction(String),
}

/// Result of a single rule-checked game operation.
pub type RuleResult<T> = Result<T, RuleViolation>;

/// Core error type for the Console Dungeon engine.
#[derive(thiserror::Error, Debug)]
pub enum DungeonError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A game rule rejected the operation
    #[error("Rule violation: {0}")]
    Rule(#[from] RuleViolation),

    /// Configuration or layout is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No session is registered under the id
    #[error("Game with ID {0} was not found")]
    SessionNotFound(String),

    /// The session has already finished
    #[error("Game {0} has already ended")]
    SessionEnded(String),

    /// A transport request is missing a field it needs
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The registry refuses new sessions
    #[error("Session limit of {0} reached")]
    RegistryFull(usize),
}

/// Result type used throughout the Console Dungeon codebase.
pub type DungeonResult<T> = Result<T, DungeonError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default board width in cells
    pub const DEFAULT_BOARD_WIDTH: i32 = 8;

    /// Default board length in cells
    pub const DEFAULT_BOARD_LENGTH: i32 = 8;

    /// Points for opening a treasure chest
    pub const CHEST_SCORE: i64 = 50;

    /// Points for defeating a regular enemy
    pub const ENEMY_SCORE: i64 = 100;

    /// Points for defeating the boss
    pub const BOSS_SCORE: i64 = 200;

    /// Points lost when a friendly character dies
    pub const FRIENDLY_DEATH_PENALTY: i64 = 100;

    /// Points deducted per executed action at final scoring
    pub const ACTION_PENALTY: i64 = 5;

    /// Energy spent by a single flight, regardless of distance
    pub const FLY_ENERGY_COST: i32 = 5;

    /// Seconds after which an idle registry session expires
    pub const SESSION_EXPIRATION_SECS: u64 = 5 * 60 * 60;

    /// Upper bound of concurrently registered sessions
    pub const MAX_SESSIONS: usize = 1000;

    /// Default address of the TCP transport
    pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";
}
