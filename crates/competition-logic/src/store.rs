//! Durable storage for engine state
//!
//! `JsonFileStore` keeps a snapshot (`state.json`, replaced atomically by
//! rename) and an append-only event journal (`events.jsonl`). A commit is
//! visible on disk only once both have been written; a failure in either
//! step rolls the other back.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use crate::error::{ArenaError, ArenaResult};
use crate::state::{ArenaState, Event};

const STATE_FILE: &str = "state.json";
const EVENTS_FILE: &str = "events.jsonl";

/// Where committed state goes
pub trait Store: Send {
    /// Last committed state, `None` for a fresh store
    fn load(&mut self) -> ArenaResult<Option<ArenaState>>;

    /// Persist `state` together with the events that produced it
    fn commit(&mut self, state: &ArenaState, events: &[Event]) -> ArenaResult<()>;
}

/// Volatile store, state lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Option<ArenaState>,
    events: Vec<Event>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

impl Store for MemoryStore {
    fn load(&mut self) -> ArenaResult<Option<ArenaState>> {
        Ok(self.state.clone())
    }

    fn commit(&mut self, state: &ArenaState, events: &[Event]) -> ArenaResult<()> {
        self.state = Some(state.clone());
        self.events.extend_from_slice(events);
        Ok(())
    }
}

/// Snapshot + journal in a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

fn io_err(context: &str, e: impl std::fmt::Display) -> ArenaError {
    ArenaError::Storage(format!("{}: {}", context, e))
}

impl JsonFileStore {
    /// Use `dir`, creating it if needed
    pub fn new(dir: impl AsRef<Path>) -> ArenaResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| io_err("create store directory", e))?;
        Ok(Self { dir })
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }

    /// Replay the journal, oldest first
    pub fn read_events(&self) -> ArenaResult<Vec<Event>> {
        let path = self.events_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path).map_err(|e| io_err("open journal", e))?;
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| io_err("read journal", e))?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|e| io_err("decode journal", e))?;
            events.push(event);
        }
        Ok(events)
    }

    fn tmp_path(&self) -> PathBuf {
        self.dir.join(format!("{}.tmp", STATE_FILE))
    }

    /// Write the next snapshot beside the live one, not yet visible to `load`
    fn stage_snapshot(&self, state: &ArenaState) -> ArenaResult<PathBuf> {
        let tmp = self.tmp_path();
        let bytes = serde_json::to_vec_pretty(state).map_err(|e| io_err("encode state", e))?;
        let mut file = File::create(&tmp).map_err(|e| io_err("create snapshot", e))?;
        file.write_all(&bytes).map_err(|e| io_err("write snapshot", e))?;
        file.sync_all().map_err(|e| io_err("sync snapshot", e))?;
        Ok(tmp)
    }

    /// Current journal length, the point to truncate back to on failure
    fn journal_mark(&self) -> u64 {
        fs::metadata(self.events_path())
            .ok()
            .filter(|m| m.is_file())
            .map_or(0, |m| m.len())
    }

    fn truncate_journal(&self, mark: u64) {
        let path = self.events_path();
        if !path.is_file() {
            return;
        }
        if let Err(e) = OpenOptions::new().write(true).open(&path).and_then(|f| f.set_len(mark)) {
            warn!(path = %path.display(), error = %e, "failed to roll back journal");
        }
    }

    fn append_events(&self, events: &[Event]) -> ArenaResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        let mut buf = String::new();
        for event in events {
            let line = serde_json::to_string(event).map_err(|e| io_err("encode event", e))?;
            buf.push_str(&line);
            buf.push('\n');
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.events_path())
            .map_err(|e| io_err("open journal", e))?;
        file.write_all(buf.as_bytes()).map_err(|e| io_err("append journal", e))?;
        file.sync_data().map_err(|e| io_err("sync journal", e))
    }
}

impl Store for JsonFileStore {
    fn load(&mut self) -> ArenaResult<Option<ArenaState>> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|e| io_err("read snapshot", e))?;
        let state = serde_json::from_slice(&bytes).map_err(|e| io_err("decode snapshot", e))?;
        Ok(Some(state))
    }

    fn commit(&mut self, state: &ArenaState, events: &[Event]) -> ArenaResult<()> {
        let tmp = self.stage_snapshot(state)?;
        let mark = self.journal_mark();

        let published = self
            .append_events(events)
            .and_then(|()| fs::rename(&tmp, self.state_path()).map_err(|e| io_err("replace snapshot", e)));
        if let Err(e) = published {
            self.truncate_journal(mark);
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }
}
