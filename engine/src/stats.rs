//! Statistics ledger: cumulative totals and the day-based streak.
//!
//! Mutated only when a session completes, never decremented. Persistence is
//! best-effort; a failed read yields a zeroed ledger and a failed write is
//! logged and forgotten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use boxbreath_utils::{atomic_write, recover_bak_file};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const STATS_FILE: &str = "stats.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsLedger {
    pub total_sessions: u64,
    pub total_minutes: u64,
    pub total_cycles: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_session_date: Option<NaiveDate>,
}

impl StatisticsLedger {
    /// Apply one completed session.
    ///
    /// Streak rule: first ever session or a gap of two or more days starts at
    /// 1; a session on the day after the last one extends the streak; another
    /// session on the same day leaves it unchanged.
    pub fn record_session(&mut self, elapsed_secs: u64, cycles: u32, today: NaiveDate) {
        self.total_sessions += 1;
        self.total_minutes += rounded_minutes(elapsed_secs);
        self.total_cycles += u64::from(cycles);

        self.current_streak = match self.last_session_date {
            Some(last) if last == today => self.current_streak.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.current_streak.saturating_add(1),
            _ => 1,
        };
        self.last_session_date = Some(today);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_sessions == 0
    }
}

/// Whole minutes, rounded half up.
#[must_use]
pub fn rounded_minutes(elapsed_secs: u64) -> u64 {
    (elapsed_secs + 30) / 60
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode statistics: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Durable home of the ledger.
pub trait LedgerStore: Send {
    fn load(&mut self) -> Result<StatisticsLedger, StatsError>;
    fn save(&mut self, ledger: &StatisticsLedger) -> Result<(), StatsError>;
}

/// JSON file written with temp-file + rename.
#[derive(Debug, Clone)]
pub struct FileLedgerStore {
    path: PathBuf,
}

impl FileLedgerStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `stats.json` inside `data_dir`.
    #[must_use]
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STATS_FILE))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for FileLedgerStore {
    fn load(&mut self) -> Result<StatisticsLedger, StatsError> {
        recover_bak_file(&self.path);
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(StatisticsLedger::default());
            }
            Err(source) => {
                return Err(StatsError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StatsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&mut self, ledger: &StatisticsLedger) -> Result<(), StatsError> {
        let bytes = serde_json::to_vec_pretty(ledger).map_err(StatsError::Encode)?;
        let write_err = |source| StatsError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        atomic_write(&self.path, &bytes).map_err(write_err)
    }
}

/// In-process store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    slot: Arc<Mutex<Option<StatisticsLedger>>>,
}

impl MemoryLedgerStore {
    #[must_use]
    pub fn with_ledger(ledger: StatisticsLedger) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(ledger))),
        }
    }

    /// Last saved ledger, if any.
    #[must_use]
    pub fn saved(&self) -> Option<StatisticsLedger> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&mut self) -> Result<StatisticsLedger, StatsError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&mut self, ledger: &StatisticsLedger) -> Result<(), StatsError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(ledger.clone());
        Ok(())
    }
}

/// The live ledger plus where it is persisted.
pub struct Statistics {
    ledger: StatisticsLedger,
    store: Box<dyn LedgerStore>,
}

impl std::fmt::Debug for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statistics")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl Statistics {
    /// Load once at startup. Unreadable storage yields a zeroed ledger.
    pub fn load(mut store: Box<dyn LedgerStore>) -> Self {
        let ledger = store.load().unwrap_or_else(|err| {
            tracing::warn!("Statistics unavailable, starting from zero: {err}");
            StatisticsLedger::default()
        });
        Self { ledger, store }
    }

    #[must_use]
    pub fn ledger(&self) -> &StatisticsLedger {
        &self.ledger
    }

    /// Record a completed session and flush it. A failed flush is logged;
    /// the in-memory ledger keeps the update.
    pub fn commit(&mut self, elapsed_secs: u64, cycles: u32, today: NaiveDate) {
        self.ledger.record_session(elapsed_secs, cycles, today);
        tracing::info!(
            sessions = self.ledger.total_sessions,
            streak = self.ledger.current_streak,
            "session recorded"
        );
        if let Err(err) = self.store.save(&self.ledger) {
            tracing::warn!("Failed to save statistics: {err}");
        }
    }
}
