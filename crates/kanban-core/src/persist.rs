//! Snapshot persistence
//!
//! One snapshot lives in one slot. Saving is best-effort: a failed write is
//! logged and dropped, the in-memory store stays authoritative. Loading
//! treats anything unreadable, malformed or from another schema version as
//! "no saved state".

use crate::model::SNAPSHOT_VERSION;
use crate::{Error, Result, Snapshot};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

const REQUIRED_FIELDS: [&str; 3] = ["board", "lists", "cards"];

/// A single durable key-value slot holding serialized text
pub trait Slot {
    /// Read the slot; `Ok(None)` when nothing has been stored yet
    fn read(&self) -> Result<Option<String>>;

    /// Replace the slot's contents
    fn write(&self, value: &str) -> Result<()>;
}

/// Slot backed by one JSON file
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn write(&self, value: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write aside then rename so a crash never leaves a half-written slot
        let tmp = self.temp_path();
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-process slot; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-filled with `value`
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Arc::new(Mutex::new(Some(value.into()))),
        }
    }

    /// Current raw contents
    pub fn contents(&self) -> Option<String> {
        self.value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&self, value: &str) -> Result<()> {
        *self
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(value.to_string());
        Ok(())
    }
}

/// Serialize a snapshot to its stored text form
pub fn encode(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parse and validate stored text
///
/// Rejects text that is not JSON, whose `version` is not the current schema
/// tag, or that lacks `board`, `lists` or `cards`.
pub fn decode(raw: &str) -> Result<Snapshot> {
    let value: Value = serde_json::from_str(raw)?;

    match value.get("version") {
        None | Some(Value::Null) => return Err(Error::MissingField("version")),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(v) if v == i64::from(SNAPSHOT_VERSION) => {}
            Some(found) => {
                return Err(Error::UnsupportedVersion {
                    found,
                    expected: SNAPSHOT_VERSION,
                });
            }
            None => return Err(Error::InvalidVersion(n.to_string())),
        },
        Some(other) => return Err(Error::InvalidVersion(other.to_string())),
    }

    for field in REQUIRED_FIELDS {
        if value.get(field).is_none_or(Value::is_null) {
            return Err(Error::MissingField(field));
        }
    }

    Ok(serde_json::from_value(value)?)
}

/// Saves and loads snapshots through a slot
#[derive(Debug, Clone)]
pub struct Persistence<S: Slot> {
    slot: S,
}

impl<S: Slot> Persistence<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    /// Write the snapshot, reporting failures to the caller
    pub fn try_save(&self, snapshot: &Snapshot) -> Result<()> {
        let text = encode(snapshot)?;
        self.slot.write(&text)
    }

    /// Write the snapshot; failures are logged and otherwise ignored
    pub fn save(&self, snapshot: &Snapshot) {
        if let Err(e) = self.try_save(snapshot) {
            warn!(error = %e, "failed to save snapshot; keeping in-memory state");
        }
    }

    /// Read the stored snapshot, or `None` if there is no usable one
    pub fn load(&self) -> Option<Snapshot> {
        let raw = match self.slot.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored snapshot");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "failed to read snapshot slot");
                return None;
            }
        };

        match decode(&raw) {
            Ok(snapshot) => {
                if let Err(e) = snapshot.check_integrity() {
                    warn!(error = %e, "stored snapshot is inconsistent");
                }
                Some(snapshot)
            }
            Err(e) => {
                debug!(error = %e, "ignoring stored snapshot");
                None
            }
        }
    }

    /// The stored snapshot, or an empty board titled `title`
    pub fn load_or_default(&self, title: &str) -> Snapshot {
        self.load().unwrap_or_else(|| Snapshot::empty(title))
    }
}
