//! Brain state persistence.
//!
//! A [`BrainSnapshot`] is a point-in-time dump of a vector brain: emotional
//! state, episodic buffer, and relationships. It is stored as a JSON
//! document, either in a standalone file ([`NeuralBrain::save_state`]) or in
//! a per-world SQLite database ([`SnapshotStore`]):
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS brain_snapshots (
//!     agent_id   INTEGER PRIMARY KEY,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```
//!
//! Loading is best-effort: a missing or malformed field falls back to its
//! default and a malformed list item is skipped, each with a warning. Only a
//! document that is not a JSON object at all is rejected.
//!
//! [`NeuralBrain::save_state`]: crate::brain::NeuralBrain::save_state

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, params};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::emotion::EmotionalState;
use crate::error::{BrainzError, Result};
use crate::memory::EpisodicMemory;
use crate::types::{AgentId, Tick};

/// Current snapshot document version.
pub const FORMAT_VERSION: u32 = 2;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS brain_snapshots (
    agent_id   INTEGER PRIMARY KEY,
    data       BLOB NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

// ---------------------------------------------------------------------------
// Snapshot document
// ---------------------------------------------------------------------------

/// A persisted relationship, keyed by peer in [`BrainSnapshot`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotRelationship {
    /// Derived trust at save time.
    pub trust: f32,
    /// Derived affinity at save time.
    pub affinity: f32,
    /// Tick of the most recent interaction.
    pub last_interaction: Tick,
    /// Learned embedding. When empty, trust and affinity seed the first two
    /// components on restore.
    pub embedding: Vec<f32>,
}

/// Point-in-time dump of a vector brain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainSnapshot {
    /// Document version.
    pub format_version: u32,
    /// Owning agent.
    pub agent_id: AgentId,
    /// Emotional state.
    pub emotional_state: EmotionalState,
    /// Episodic buffer, oldest first.
    pub memory_buffer: Vec<EpisodicMemory>,
    /// Relationships by peer.
    pub relationships: BTreeMap<AgentId, SnapshotRelationship>,
    /// Number of logged experiences at save time. Informational only.
    pub replay_buffer_size: usize,
    /// Wall-clock save time.
    pub saved_at: DateTime<Utc>,
}

/// Encode a snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`BrainzError::Serialization`] if encoding fails.
pub fn snapshot_to_json(snapshot: &BrainSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Decode a snapshot, defaulting whatever is missing or malformed.
///
/// # Errors
///
/// Returns [`BrainzError::Serialization`] if `json` does not parse, or
/// [`BrainzError::UnsupportedSnapshot`] if it parses to something other than
/// an object.
pub fn snapshot_from_json(json: &str) -> Result<BrainSnapshot> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(doc) = value else {
        return Err(BrainzError::UnsupportedSnapshot(
            "document is not a JSON object".to_string(),
        ));
    };

    let format_version = field(&doc, "format_version", 1_u32);
    if format_version > FORMAT_VERSION {
        warn!(
            found = format_version,
            supported = FORMAT_VERSION,
            "Snapshot is newer than this build, loading what is understood"
        );
    }

    let mut emotional_state: EmotionalState =
        field(&doc, "emotional_state", EmotionalState::NEUTRAL);
    emotional_state.clamp();

    Ok(BrainSnapshot {
        format_version,
        agent_id: field(&doc, "agent_id", AgentId::NONE),
        emotional_state,
        memory_buffer: items(&doc, "memory_buffer"),
        relationships: relationships(&doc),
        replay_buffer_size: field(&doc, "replay_buffer_size", 0),
        saved_at: field(&doc, "saved_at", DateTime::<Utc>::default()),
    })
}

fn field<T: DeserializeOwned>(doc: &Map<String, Value>, key: &str, default: T) -> T {
    let Some(value) = doc.get(key) else {
        warn!(field = key, "Snapshot field missing, using default");
        return default;
    };
    T::deserialize(value).unwrap_or_else(|e| {
        warn!(field = key, error = %e, "Malformed snapshot field, using default");
        default
    })
}

fn items<T: DeserializeOwned>(doc: &Map<String, Value>, key: &str) -> Vec<T> {
    let Some(list) = doc.get(key).and_then(Value::as_array) else {
        warn!(field = key, "Snapshot list missing or not an array");
        return Vec::new();
    };
    list.iter()
        .enumerate()
        .filter_map(|(i, item)| match T::deserialize(item) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(field = key, index = i, error = %e, "Skipping malformed snapshot item");
                None
            }
        })
        .collect()
}

fn relationships(doc: &Map<String, Value>) -> BTreeMap<AgentId, SnapshotRelationship> {
    let Some(map) = doc.get("relationships").and_then(Value::as_object) else {
        warn!(field = "relationships", "Snapshot map missing or not an object");
        return BTreeMap::new();
    };
    let mut out = BTreeMap::new();
    for (key, value) in map {
        let Ok(peer) = key.parse::<u32>() else {
            warn!(peer = %key, "Skipping relationship with invalid peer id");
            continue;
        };
        match SnapshotRelationship::deserialize(value) {
            Ok(rel) => {
                out.insert(AgentId(peer), rel);
            }
            Err(e) => warn!(peer = %key, error = %e, "Skipping malformed relationship"),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

fn crc32_hex(data: &[u8]) -> String {
    format!("{:08x}", crc32_compute(data))
}

/// CRC-32 (ISO 3309 / ITU-T V.42).
fn crc32_compute(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            if crc & 1 == 1 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    !crc
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// SQLite database of brain snapshots, one row per agent.
///
/// ```no_run
/// # use brainz_core::persistence::SnapshotStore;
/// # use brainz_core::config::{BrainzConfig, PersistenceConfig};
/// # use brainz_core::brain::NeuralBrain;
/// # use brainz_core::types::AgentId;
/// let store = SnapshotStore::open("world_save.db", &PersistenceConfig::default())?;
/// let brain = NeuralBrain::new(AgentId(3), 7, &BrainzConfig::default());
/// store.save(&brain.snapshot())?;
/// let loaded = store.load(AgentId(3))?;
/// # Ok::<(), brainz_core::error::BrainzError>(())
/// ```
pub struct SnapshotStore {
    conn: Connection,
    config: PersistenceConfig,
    db_path: PathBuf,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("db_path", &self.db_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SnapshotStore {
    /// Open (or create) a database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Snapshot store opened"
        );

        Ok(Self {
            conn,
            config: config.clone(),
            db_path,
        })
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            config: config.clone(),
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Save (upsert) a snapshot under its agent id.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Serialization`] if encoding fails, or
    /// [`BrainzError::Database`] on SQLite failures.
    pub fn save(&self, snapshot: &BrainSnapshot) -> Result<()> {
        let start = Instant::now();
        let json = serde_json::to_vec(snapshot)?;
        let checksum = self.config.checksum_enabled.then(|| crc32_hex(&json));
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO brain_snapshots (agent_id, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(agent_id) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![snapshot.agent_id.0, json, now, checksum],
        )?;

        debug!(
            agent = %snapshot.agent_id,
            memories = snapshot.memory_buffer.len(),
            bytes = json.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Saved brain snapshot"
        );
        Ok(())
    }

    /// Load an agent's snapshot, or `None` if none is stored. A checksum
    /// mismatch is logged and the data is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Serialization`] or
    /// [`BrainzError::UnsupportedSnapshot`] if the stored document is
    /// unusable, or [`BrainzError::Database`] on SQLite failures.
    pub fn load(&self, agent: AgentId) -> Result<Option<BrainSnapshot>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT data, checksum FROM brain_snapshots WHERE agent_id = ?1")?;
        let row: Option<(Vec<u8>, Option<String>)> = stmt
            .query_row(params![agent.0], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((data, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.config.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(&data);
                if expected != actual {
                    warn!(
                        agent = %agent,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, possible save corruption"
                    );
                }
            }
        }

        let json = std::str::from_utf8(&data)
            .map_err(|e| BrainzError::Serialization(e.to_string()))?;
        snapshot_from_json(json).map(Some)
    }

    /// Delete an agent's snapshot. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Database`] on SQLite failures.
    pub fn delete(&self, agent: AgentId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM brain_snapshots WHERE agent_id = ?1", params![agent.0])?;
        Ok(deleted > 0)
    }

    /// Agents with a stored snapshot, ascending.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Database`] on SQLite failures.
    pub fn list_agents(&self) -> Result<Vec<AgentId>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT agent_id FROM brain_snapshots ORDER BY agent_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        let mut agents = Vec::new();
        for row in rows {
            let raw = row?;
            match u32::try_from(raw) {
                Ok(id) => agents.push(AgentId(id)),
                Err(_) => warn!(id = raw, "Skipping row with out-of-range agent id"),
            }
        }
        Ok(agents)
    }

    /// Number of stored snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Database`] on SQLite failures.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM brain_snapshots", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Path to the database file (`:memory:` for in-memory stores).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run SQLite's integrity check. `Ok(false)` means corruption.
    ///
    /// # Errors
    ///
    /// Returns [`BrainzError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }
}

/// Adds `.optional()` to `rusqlite::Result`.
trait OptionalExt<T> {
    /// Convert `QueryReturnedNoRows` into `Ok(None)`.
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
