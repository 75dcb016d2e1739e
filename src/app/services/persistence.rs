//! Durable project snapshot with sliding 30-day expiry.
//!
//! The whole project lives in one fixed key of a string key-value store.
//! Every successful save or load pushes `expiresAt` 30 days past "now".

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::app::controllers::tabs::Folder;
use crate::app::domain::{FileKey, ProjectStore};
use crate::app::infrastructure::error::{AppError, Result};

pub const STORAGE_KEY: &str = "ferrisplay.project";
pub const SCHEMA_VERSION: u32 = 1;
pub const EXPIRY_DAYS: i64 = 30;

/// String-keyed get/set/remove storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock(Rc<Cell<DateTime<Utc>>>);

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Rc::new(Cell::new(start)))
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

/// What gets persisted: file contents, the active file and view layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project: ProjectStore,
    pub active_file: Option<FileKey>,
    #[serde(default)]
    pub open_tabs: Vec<FileKey>,
    #[serde(default)]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotEnvelope {
    schema_version: u32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    payload: ProjectSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageInfo {
    pub days_left: i64,
    pub last_accessed_at: DateTime<Utc>,
    pub is_expired: bool,
}

/// Result of reading the slot at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Restored(ProjectSnapshot),
    Missing,
    Expired,
    /// The slot holds data that does not parse; it has been cleared.
    Corrupted,
    /// The store itself failed to read. The slot is left untouched.
    Unreadable,
}

impl LoadOutcome {
    pub fn into_snapshot(self) -> Option<ProjectSnapshot> {
        match self {
            LoadOutcome::Restored(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
}

impl PersistenceGateway {
    pub fn new(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn read_envelope(&self) -> Result<Option<SnapshotEnvelope>> {
        let Some(raw) = self.store.get(STORAGE_KEY)? else {
            return Ok(None);
        };
        parse_envelope(&raw).map(Some)
    }

    fn write_envelope(&mut self, envelope: &SnapshotEnvelope) -> Result<()> {
        let json = serde_json::to_string(envelope)
            .map_err(|e| AppError::StorageFailure(format!("Failed to serialize project: {}", e)))?;
        self.store.set(STORAGE_KEY, &json)
    }

    /// Persist `payload`, keeping the original `createdAt` and sliding the
    /// expiry window. On failure the previous slot content is left as is.
    pub fn save(&mut self, payload: &ProjectSnapshot) -> Result<()> {
        let now = self.clock.now();
        let created_at = self
            .read_envelope()
            .ok()
            .flatten()
            .map(|e| e.created_at)
            .unwrap_or(now);
        let envelope = SnapshotEnvelope {
            schema_version: SCHEMA_VERSION,
            created_at,
            expires_at: now + Duration::days(EXPIRY_DAYS),
            last_accessed_at: now,
            payload: payload.clone(),
        };
        self.write_envelope(&envelope)?;
        tracing::debug!("Project saved, expires {}", envelope.expires_at);
        Ok(())
    }

    /// Read the slot, distinguishing missing, expired and corrupted data.
    /// Only data that fails to parse is cleared; a store error leaves it alone.
    pub fn restore(&mut self) -> LoadOutcome {
        let now = self.clock.now();
        let raw = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadOutcome::Missing,
            Err(e) => {
                tracing::warn!("Could not read project snapshot: {}", e);
                return LoadOutcome::Unreadable;
            }
        };
        let mut envelope = match parse_envelope(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Discarding corrupted project snapshot: {}", e);
                self.clear_quietly();
                return LoadOutcome::Corrupted;
            }
        };

        if now > envelope.expires_at {
            tracing::info!("Saved project expired at {}", envelope.expires_at);
            self.clear_quietly();
            return LoadOutcome::Expired;
        }

        envelope.last_accessed_at = now;
        envelope.expires_at = now + Duration::days(EXPIRY_DAYS);
        if let Err(e) = self.write_envelope(&envelope) {
            tracing::warn!("Could not refresh project expiry: {}", e);
        }
        LoadOutcome::Restored(envelope.payload)
    }

    pub fn load(&mut self) -> Option<ProjectSnapshot> {
        self.restore().into_snapshot()
    }

    /// True when a readable, unexpired snapshot is stored.
    pub fn exists(&self) -> bool {
        matches!(self.read_envelope(), Ok(Some(e)) if self.clock.now() <= e.expires_at)
    }

    pub fn info(&self) -> Option<StorageInfo> {
        let envelope = self.read_envelope().ok().flatten()?;
        let now = self.clock.now();
        let remaining = envelope.expires_at - now;
        let day_ms = Duration::days(1).num_milliseconds();
        let days_left = (remaining.num_milliseconds() + day_ms - 1).div_euclid(day_ms).max(0);
        Some(StorageInfo {
            days_left,
            last_accessed_at: envelope.last_accessed_at,
            is_expired: now > envelope.expires_at,
        })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(STORAGE_KEY)
    }

    fn clear_quietly(&mut self) {
        if let Err(e) = self.clear() {
            tracing::warn!("Failed to clear project snapshot: {}", e);
        }
    }
}

// Parse failures and unknown schema versions both mean the data is unusable.
fn parse_envelope(raw: &str) -> Result<SnapshotEnvelope> {
    let envelope: SnapshotEnvelope = serde_json::from_str(raw)?;
    if envelope.schema_version != SCHEMA_VERSION {
        return Err(AppError::StorageFailure(format!(
            "unsupported schema version {}",
            envelope.schema_version
        )));
    }
    Ok(envelope)
}
