//! # Audit Log & Id Generation
//!
//! Collaborators a session talks to outside of the game rules: the sink that records
//! how each game ended and the source of fresh session ids.

use crate::rendering::escape_log;
use crate::{DungeonError, DungeonResult, SessionId};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// File name of the JSON-lines audit log inside the data directory.
pub const AUDIT_LOG_FILE: &str = "logs.jsonl";

/// File name of the id counter store inside the data directory.
pub const META_FILE: &str = "meta.json";

/// One audit entry, written once per finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub game_id: SessionId,
    pub event: String,
    pub message: String,
}

/// Destination for audit records.
pub trait AuditLog: Send + Sync {
    fn log(&self, record: &AuditRecord) -> DungeonResult<()>;
}

/// Keeps records in memory, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records written so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AuditLog for MemoryAuditLog {
    fn log(&self, record: &AuditRecord) -> DungeonResult<()> {
        let mut records = match self.records.lock() {
            Ok(records) => records,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push(record.clone());
        Ok(())
    }
}

/// Appends one JSON object per line to `<data_dir>/logs.jsonl`.
#[derive(Debug)]
pub struct JsonLinesAuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesAuditLog {
    /// Creates the data directory if needed.
    pub fn new(data_dir: impl AsRef<Path>) -> DungeonResult<Self> {
        fs::create_dir_all(data_dir.as_ref())?;
        Ok(Self {
            path: data_dir.as_ref().join(AUDIT_LOG_FILE),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record back, skipping nothing.
    pub fn read_all(&self) -> DungeonResult<Vec<AuditRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        fs::read_to_string(&self.path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(DungeonError::from))
            .collect()
    }
}

impl AuditLog for JsonLinesAuditLog {
    fn log(&self, record: &AuditRecord) -> DungeonResult<()> {
        let line = serde_json::to_string(record)?;
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// Forwards records to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAuditLog;

impl AuditLog for LogAuditLog {
    fn log(&self, record: &AuditRecord) -> DungeonResult<()> {
        info!(
            "audit game_id={} event={} message={}",
            record.game_id,
            record.event,
            escape_log(&record.message)
        );
        Ok(())
    }
}

/// Source of unique session ids.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> DungeonResult<SessionId>;
}

#[derive(Debug, Serialize, Deserialize)]
struct MetaStore {
    last_game_id: u64,
}

/// Hands out 1, 2, 3, ... optionally persisting the last value to `meta.json`.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    last: AtomicU64,
    store: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl SequentialIdGenerator {
    /// In-memory counter starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter resumed from and saved to `<data_dir>/meta.json`.
    pub fn persistent(data_dir: impl AsRef<Path>) -> DungeonResult<Self> {
        fs::create_dir_all(data_dir.as_ref())?;
        let path = data_dir.as_ref().join(META_FILE);

        let last = if path.exists() {
            let meta: MetaStore = serde_json::from_str(&fs::read_to_string(&path)?)?;
            meta.last_game_id
        } else {
            0
        };

        Ok(Self {
            last: AtomicU64::new(last),
            store: Some(path),
            write_lock: Mutex::new(()),
        })
    }

    /// Last id handed out, 0 before the first.
    pub fn last_id(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> DungeonResult<SessionId> {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = self.last.load(Ordering::SeqCst) + 1;

        if let Some(path) = &self.store {
            let meta = serde_json::to_string(&MetaStore { last_game_id: id })?;
            fs::write(path, meta)?;
        }

        self.last.store(id, Ordering::SeqCst);
        Ok(SessionId::new(id.to_string()))
    }
}

/// Random v4 uuids.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> DungeonResult<SessionId> {
        Ok(SessionId::new(uuid::Uuid::new_v4().to_string()))
    }
}
