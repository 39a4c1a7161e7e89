//! # Session Registry
//!
//! Maps session ids to running games, hands out ids and seeds, and evicts sessions
//! that ended or outlived the expiration window.

use crate::{
    config, AuditLog, CommandResponse, DungeonError, DungeonResult, GameSession,
    GenerationConfig, IdGenerator, SessionId, SessionStatus,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Registry limits and the layout every new session is generated from.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Sessions older than this are evicted by [`SessionRegistry::sweep`]
    pub expiration: Duration,
    pub max_sessions: usize,
    /// Layout template; its seed is replaced per session
    pub generation: GenerationConfig,
    /// Seed of the registry RNG that draws per-session seeds
    pub seed: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            expiration: Duration::from_secs(config::SESSION_EXPIRATION_SECS),
            max_sessions: config::MAX_SESSIONS,
            generation: GenerationConfig::default(),
            seed: 42,
        }
    }
}

/// All live sessions of one server.
pub struct SessionRegistry {
    config: RegistryConfig,
    ids: Arc<dyn IdGenerator>,
    audit: Arc<dyn AuditLog>,
    rng: StdRng,
    sessions: HashMap<SessionId, GameSession>,
}

impl SessionRegistry {
    /// Creates an empty registry after validating the layout template.
    pub fn new(
        config: RegistryConfig,
        ids: Arc<dyn IdGenerator>,
        audit: Arc<dyn AuditLog>,
    ) -> DungeonResult<Self> {
        config.generation.validate()?;
        if config.max_sessions == 0 {
            return Err(DungeonError::InvalidConfig(
                "max_sessions must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            ids,
            audit,
            sessions: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Starts a new session and returns its id with the start-up narrative.
    pub fn create(&mut self) -> DungeonResult<(SessionId, String)> {
        if self.sessions.len() >= self.config.max_sessions {
            return Err(DungeonError::RegistryFull(self.config.max_sessions));
        }

        let seed: u64 = self.rng.gen();
        let id = self.ids.next_id()?;
        let session = GameSession::new(
            id.clone(),
            &self.config.generation.with_seed(seed),
            Arc::clone(&self.audit),
        )?;
        let intro = session.start();

        self.sessions.insert(id.clone(), session);
        info!("registry holds {} sessions", self.sessions.len());
        Ok((id, intro))
    }

    fn session_mut(&mut self, id: &SessionId) -> DungeonResult<&mut GameSession> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| DungeonError::SessionNotFound(id.to_string()))
    }

    /// Runs one command in the session.
    pub fn execute(&mut self, id: &SessionId, command: &str) -> DungeonResult<CommandResponse> {
        self.session_mut(id)?.execute(command)
    }

    /// Ends the session without confirmation.
    pub fn force_end(&mut self, id: &SessionId) -> DungeonResult<String> {
        self.session_mut(id)?.end()
    }

    pub fn status(&self, id: &SessionId) -> DungeonResult<SessionStatus> {
        self.sessions
            .get(id)
            .map(GameSession::status)
            .ok_or_else(|| DungeonError::SessionNotFound(id.to_string()))
    }

    /// Evicts ended sessions and sessions older than the expiration window.
    ///
    /// Stale sessions are ended first so their audit record is written. A session
    /// whose audit write fails stays registered and is retried on the next sweep.
    /// Returns the number of evicted sessions.
    pub fn sweep(&mut self, now: Instant) -> usize {
        let expiration = self.config.expiration;
        let stale: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|session| !session.is_running() || session.age(now) >= expiration)
            .map(|session| session.id().clone())
            .collect();

        let mut evicted = 0;
        for id in &stale {
            let Some(session) = self.sessions.get_mut(id) else {
                continue;
            };
            if session.is_running() {
                info!("session {} expired", id);
            }
            if session.is_running() || !session.is_audited() {
                if let Err(e) = session.end() {
                    warn!("session {} kept until its audit record is written: {}", id, e);
                    continue;
                }
            }
            self.sessions.remove(id);
            debug!("session {} evicted", id);
            evicted += 1;
        }

        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuditRecord, MemoryAuditLog, SequentialIdGenerator};
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

    fn registry(config: RegistryConfig) -> (SessionRegistry, Arc<MemoryAuditLog>) {
        let audit = Arc::new(MemoryAuditLog::new());
        let registry =
            SessionRegistry::new(config, Arc::new(SequentialIdGenerator::new()), audit.clone())
                .unwrap();
        (registry, audit)
    }

    #[test]
    fn test_create_and_execute() -> DungeonResult<()> {
        let (mut registry, _) = registry(RegistryConfig::default());
        let (id, intro) = registry.create()?;
        assert_eq!(id.as_str(), "1");
        assert!(intro.contains("A treasure chest was placed"));

        let response = registry.execute(&id, "w.move(3,2)")?;
        assert!(response.running);
        assert_eq!(registry.status(&id)?.actions, 1);
        Ok(())
    }

    #[test]
    fn test_unknown_session() {
        let (mut registry, _) = registry(RegistryConfig::default());
        let missing = SessionId::new("404");
        match registry.execute(&missing, "help") {
            Err(DungeonError::SessionNotFound(id)) => assert_eq!(id, "404"),
            other => panic!("unexpected {:?}", other.map(|r| r.text)),
        }
        assert!(registry.force_end(&missing).is_err());
        assert!(registry.status(&missing).is_err());
    }

    #[test]
    fn test_registry_full() -> DungeonResult<()> {
        let (mut registry, _) = registry(RegistryConfig {
            max_sessions: 1,
            ..RegistryConfig::default()
        });
        registry.create()?;
        assert!(matches!(registry.create(), Err(DungeonError::RegistryFull(1))));
        Ok(())
    }

    #[test]
    fn test_sweep_evicts_ended_and_expired() -> DungeonResult<()> {
        let (mut registry, audit) = registry(RegistryConfig::default());
        let (ended, _) = registry.create()?;
        let (_alive, _) = registry.create()?;

        assert_eq!(registry.force_end(&ended)?, "Game over. Your score: 0.");
        assert_eq!(registry.sweep(Instant::now()), 1);
        assert!(!registry.contains(&ended));
        assert_eq!(registry.len(), 1);

        let later = Instant::now() + Duration::from_secs(config::SESSION_EXPIRATION_SECS + 1);
        assert_eq!(registry.sweep(later), 1);
        assert!(registry.is_empty());
        assert_eq!(audit.records().len(), 2);
        Ok(())
    }

    #[test]
    fn test_sweep_keeps_session_until_audited() -> DungeonResult<()> {
        let audit = Arc::new(FlakyAuditLog {
            failures: 1,
            ..FlakyAuditLog::default()
        });
        let mut registry = SessionRegistry::new(
            RegistryConfig::default(),
            Arc::new(SequentialIdGenerator::new()),
            audit.clone(),
        )?;
        let (first, _) = registry.create()?;
        let (second, _) = registry.create()?;

        let later = Instant::now() + Duration::from_secs(config::SESSION_EXPIRATION_SECS + 1);
        assert_eq!(registry.sweep(later), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(audit.inner.records().len(), 1);

        assert_eq!(registry.sweep(later), 1);
        assert!(registry.is_empty());
        assert!(!registry.contains(&first));
        assert!(!registry.contains(&second));

        let records = audit.inner.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|record| record.event == "abandoned"));
        Ok(())
    }

    #[test]
    fn test_same_seed_same_sessions() -> DungeonResult<()> {
        let (mut first, _) = registry(RegistryConfig::default());
        let (mut second, _) = registry(RegistryConfig::default());
        assert_eq!(first.create()?.1, second.create()?.1);
        Ok(())
    }

    #[test]
    fn test_invalid_template_rejected() {
        let mut config = RegistryConfig::default();
        config.generation.width = 0;
        let result = SessionRegistry::new(
            config,
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(MemoryAuditLog::new()),
        );
        assert!(matches!(result, Err(DungeonError::InvalidConfig(_))));
    }
}
