//! # Game Session
//!
//! One running game: its generated state, its command interpreter and the audit
//! sink notified when it ends.

use crate::rendering::{escape_log, format_rejection, help_text};
use crate::{
    generate_dungeon, AuditLog, AuditRecord, CommandInterpreter, DungeonError, DungeonResult,
    GameOutcome, GameState, GenerationConfig, InterpreterState, RuleViolation,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Opaque session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    /// Text to show the player
    pub text: String,
    /// Whether the session still accepts commands
    pub running: bool,
    /// The rule that rejected the command, if any
    pub rejected: Option<RuleViolation>,
}

/// Snapshot of a session for status queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub game_id: SessionId,
    pub running: bool,
    pub score: i64,
    pub final_score: Option<i64>,
    pub actions: usize,
    pub outcome: Option<GameOutcome>,
    pub awaiting_confirmation: bool,
}

/// A single game in progress.
pub struct GameSession {
    id: SessionId,
    state: GameState,
    interpreter: CommandInterpreter,
    audit: Arc<dyn AuditLog>,
    intro: String,
    created_at: Instant,
    audited: bool,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("running", &self.state.is_running())
            .field("interpreter", &self.interpreter.state())
            .finish()
    }
}

impl GameSession {
    /// Generates a new game from the configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{GameSession, GenerationConfig, MemoryAuditLog, SessionId};
    /// use std::sync::Arc;
    ///
    /// let audit = Arc::new(MemoryAuditLog::new());
    /// let mut session = GameSession::new(SessionId::new("1"), &GenerationConfig::new(7), audit.clone()).unwrap();
    /// assert!(session.start().contains("Commands:"));
    ///
    /// let response = session.execute("w.move(3,2)").unwrap();
    /// assert_eq!(response.text, "Warrior moved to cell (3, 2).");
    /// assert!(response.running);
    /// ```
    pub fn new(
        id: SessionId,
        config: &GenerationConfig,
        audit: Arc<dyn AuditLog>,
    ) -> DungeonResult<Self> {
        let dungeon = generate_dungeon(config)?;
        info!("session {} created with seed {}", id, config.seed);

        Ok(Self {
            id,
            intro: dungeon.report_text(),
            state: dungeon.state,
            interpreter: CommandInterpreter::new(),
            audit,
            created_at: Instant::now(),
            audited: false,
        })
    }

    /// Wraps an already built state, skipping generation.
    pub fn from_state(id: SessionId, state: GameState, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            id,
            state,
            interpreter: CommandInterpreter::new(),
            audit,
            intro: String::new(),
            created_at: Instant::now(),
            audited: false,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn interpreter_state(&self) -> InterpreterState {
        self.interpreter.state()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Start-up report followed by the help text.
    pub fn start(&self) -> String {
        if self.intro.is_empty() {
            help_text()
        } else {
            format!("{}\n\n{}", self.intro, help_text())
        }
    }

    /// Runs one command line.
    ///
    /// Rule violations come back as a rejected response; commands sent after the
    /// end are errors. A failed audit write on the final command is logged and
    /// retried by the next [`GameSession::end`].
    pub fn execute(&mut self, line: &str) -> DungeonResult<CommandResponse> {
        if !self.state.is_running() {
            return Err(DungeonError::SessionEnded(self.id.to_string()));
        }

        let response = match self.interpreter.handle(&mut self.state, line) {
            Ok(text) => CommandResponse {
                text,
                running: self.state.is_running(),
                rejected: None,
            },
            Err(violation) => {
                debug!("session {} rejected '{}': {}", self.id, escape_log(line), violation);
                CommandResponse {
                    text: format_rejection(&violation),
                    running: true,
                    rejected: Some(violation),
                }
            }
        };

        if !response.running {
            if let Err(e) = self.record_end() {
                warn!("session {} audit write failed: {}", self.id, e);
            }
        }

        Ok(response)
    }

    /// Ends the game without confirmation and returns the final-score message.
    ///
    /// Also writes the audit record if an earlier write failed.
    pub fn end(&mut self) -> DungeonResult<String> {
        let message = match self.state.outcome() {
            Some(outcome) => self.state.finish(outcome),
            None => self.state.finish(GameOutcome::Abandoned),
        };
        self.record_end()?;
        Ok(message)
    }

    /// Writes the single audit record of this session.
    fn record_end(&mut self) -> DungeonResult<()> {
        if self.audited {
            return Ok(());
        }

        let outcome = self.state.outcome().unwrap_or(GameOutcome::Abandoned);
        let record = AuditRecord {
            game_id: self.id.clone(),
            event: outcome.event_name().to_string(),
            message: format!(
                "final_score={} actions={} {}",
                self.state.final_score().unwrap_or_default(),
                self.state.history().len(),
                self.state.statistics().summary()
            ),
        };

        self.audit.log(&record)?;
        self.audited = true;
        info!("session {} ended: {}", self.id, record.event);
        Ok(())
    }

    /// True once the audit record of this session has been written.
    pub fn is_audited(&self) -> bool {
        self.audited
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            game_id: self.id.clone(),
            running: self.state.is_running(),
            score: self.state.score(),
            final_score: self.state.final_score(),
            actions: self.state.history().len(),
            outcome: self.state.outcome(),
            awaiting_confirmation: self.interpreter.state()
                == InterpreterState::AwaitingEndConfirmation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryAuditLog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` writes, then forwards to memory.
    #[derive(Debug, Default)]
    struct FlakyAuditLog {
        failures: usize,
        calls: AtomicUsize,
        inner: MemoryAuditLog,
    }

    impl AuditLog for FlakyAuditLog {
        fn log(&self, record: &AuditRecord) -> DungeonResult<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into());
            }
            self.inner.log(record)
        }
    }

    fn session(audit: Arc<MemoryAuditLog>) -> GameSession {
        GameSession::new(SessionId::new("42"), &GenerationConfig::new(42), audit).unwrap()
    }

    #[test]
    fn test_start_contains_report_and_help() {
        let session = session(Arc::new(MemoryAuditLog::new()));
        let text = session.start();
        assert!(text.starts_with("...Preparing the backpack..."));
        assert!(text.contains("Commands:"));
    }

    #[test]
    fn test_rejected_command_keeps_running() -> DungeonResult<()> {
        let mut session = session(Arc::new(MemoryAuditLog::new()));
        let response = session.execute("w.move(0,0)")?;
        assert!(response.running);
        assert!(matches!(response.rejected, Some(RuleViolation::OutOfBounds(_))));
        assert!(response.text.starts_with("Operation cannot be performed."));
        Ok(())
    }

    #[test]
    fn test_confirmed_end_writes_one_audit_record() -> DungeonResult<()> {
        let audit = Arc::new(MemoryAuditLog::new());
        let mut session = session(audit.clone());

        session.execute("end_game")?;
        let response = session.execute("yes")?;
        assert!(!response.running);
        assert_eq!(response.text, "Game over. Your score: 0.");

        assert!(matches!(
            session.execute("help"),
            Err(DungeonError::SessionEnded(_))
        ));
        session.end()?;

        let records = audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event, "abandoned");
        assert!(records[0].message.starts_with("final_score=0 actions=0"));
        Ok(())
    }

    #[test]
    fn test_force_end_reports_final_score() -> DungeonResult<()> {
        let audit = Arc::new(MemoryAuditLog::new());
        let mut session = session(audit.clone());
        session.execute("w.move(3,2)")?;

        assert_eq!(session.end()?, "Game over. Your score: -5.");
        assert!(!session.is_running());
        assert_eq!(session.status().final_score, Some(-5));
        assert_eq!(audit.records().len(), 1);
        Ok(())
    }

    #[test]
    fn test_status_tracks_confirmation() -> DungeonResult<()> {
        let mut session = session(Arc::new(MemoryAuditLog::new()));
        session.execute("end_game")?;
        let status = session.status();
        assert!(status.awaiting_confirmation);
        assert!(status.running);
        assert_eq!(
            session.interpreter_state(),
            InterpreterState::AwaitingEndConfirmation
        );
        assert_eq!(status.game_id.as_str(), "42");
        Ok(())
    }

    #[test]
    fn test_failed_audit_write_is_retried_by_end() -> DungeonResult<()> {
        let audit = Arc::new(FlakyAuditLog {
            failures: 1,
            ..FlakyAuditLog::default()
        });
        let mut session =
            GameSession::new(SessionId::new("7"), &GenerationConfig::new(42), audit.clone())?;

        session.execute("end_game")?;
        let response = session.execute("yes")?;
        assert!(!response.running);
        assert_eq!(response.text, "Game over. Your score: 0.");
        assert!(!session.is_audited());
        assert!(audit.inner.records().is_empty());

        assert_eq!(session.end()?, "Game over. Your score: 0.");
        assert!(session.is_audited());
        session.end()?;

        assert_eq!(audit.calls.load(Ordering::SeqCst), 2);
        assert_eq!(audit.inner.records().len(), 1);
        Ok(())
    }
}
