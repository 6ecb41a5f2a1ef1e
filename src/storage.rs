// 🗄️ Card storage - one keyed blob holding the whole card list
//
// The vault is rewritten wholesale on every mutation. Reads never fail:
// a missing, tampered, or malformed blob is an empty vault.

use crate::card::Card;
use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::cell::RefCell;
use std::path::Path;

// ============================================================================
// STORAGE SEAM
// ============================================================================

pub trait CardStorage {
    /// Read the persisted card list. Absent or malformed data yields `[]`.
    fn load(&self) -> Vec<Card>;

    /// Replace the persisted card list.
    fn save(&self, cards: &[Card]) -> Result<()>;
}

fn decode_cards(key: &str, raw: &str) -> Vec<Card> {
    match serde_json::from_str::<Vec<Card>>(raw) {
        Ok(cards) => cards,
        Err(e) => {
            tracing::warn!(key, error = %e, "persisted card list is malformed, starting empty");
            Vec::new()
        }
    }
}

/// SHA-256 of the stored blob, used to spot a value edited behind our back
pub fn compute_checksum(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

// ============================================================================
// SQLITE BACKEND
// ============================================================================

pub struct SqliteStorage {
    conn: Connection,
    key: String,
}

impl SqliteStorage {
    pub fn open(path: &Path, key: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, key)
    }

    pub fn open_in_memory(key: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, key)
    }

    pub fn with_connection(conn: Connection, key: &str) -> Result<Self> {
        setup_database(&conn)?;
        let key = if key.trim().is_empty() { DEFAULT_STORAGE_KEY } else { key };
        Ok(SqliteStorage {
            conn,
            key: key.to_string(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read a raw value, ignoring rows whose checksum no longer matches
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT value, checksum FROM kv_store WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((value, checksum)) if compute_checksum(&value) == checksum => Ok(Some(value)),
            Some(_) => {
                tracing::warn!(key, "checksum mismatch on stored value, ignoring it");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub fn put_raw(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, checksum, updated_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                checksum = excluded.checksum,
                updated_at = excluded.updated_at",
            params![key, value, compute_checksum(value), Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn delete_raw(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl CardStorage for SqliteStorage {
    fn load(&self) -> Vec<Card> {
        match self.get_raw(&self.key) {
            Ok(Some(raw)) => decode_cards(&self.key, &raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "could not read card list, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, cards: &[Card]) -> Result<()> {
        let raw = serde_json::to_string(cards)?;
        self.put_raw(&self.key, &raw)
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL for crash recovery (in-memory databases silently keep "memory")
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    tracing::debug!(journal_mode = %mode, "database ready");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            checksum TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// IN-MEMORY BACKEND
// ============================================================================

/// Blob held in memory, encoded exactly like the SQLite backend
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an arbitrary (possibly corrupt) blob
    pub fn with_blob(raw: &str) -> Self {
        MemoryStorage {
            blob: RefCell::new(Some(raw.to_string())),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob.borrow().clone()
    }
}

impl CardStorage for MemoryStorage {
    fn load(&self) -> Vec<Card> {
        match self.blob.borrow().as_deref() {
            Some(raw) => decode_cards("memory", raw),
            None => Vec::new(),
        }
    }

    fn save(&self, cards: &[Card]) -> Result<()> {
        let raw = serde_json::to_string(cards)?;
        *self.blob.borrow_mut() = Some(raw);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
