//! Room persistence: a key-value table of JSON snapshots in SQLite.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::room::{Room, RoomSnapshot};

/// Saves and restores room snapshots. The server owns exactly one store and
/// touches it only from its own context.
pub trait Store: Send {
    /// Persists a room, assigning its id on first save. Idempotent.
    fn save_room(&mut self, room: &mut Room) -> Result<()>;

    /// Returns every snapshot whose game had not finished.
    fn load_unfinished(&mut self) -> Result<Vec<RoomSnapshot>>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("open store {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS rooms (
                id INTEGER PRIMARY KEY,
                finished INTEGER NOT NULL,
                snapshot TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    fn save_room(&mut self, room: &mut Room) -> Result<()> {
        if room.id.is_none() {
            let mut insert = self
                .conn
                .prepare_cached("INSERT INTO rooms (finished, snapshot) VALUES (?1, '{}');")?;
            insert.execute((room.finished(),))?;
            room.id = Some(self.conn.last_insert_rowid());
        }
        let snapshot = room.snapshot();
        let json = serde_json::to_string(&snapshot).context("serialize room")?;
        let mut update = self
            .conn
            .prepare_cached("UPDATE rooms SET finished = ?1, snapshot = ?2 WHERE id = ?3;")?;
        update.execute((room.finished(), json, room.id))?;
        Ok(())
    }

    fn load_unfinished(&mut self) -> Result<Vec<RoomSnapshot>> {
        let mut query = self
            .conn
            .prepare_cached("SELECT id, snapshot FROM rooms WHERE finished = 0;")?;
        let rows = query.query_map((), |row| {
            let id: i64 = row.get(0)?;
            let json: String = row.get(1)?;
            Ok((id, json))
        })?;
        let mut snapshots = Vec::new();
        for row in rows {
            let (id, json) = row?;
            let mut snapshot: RoomSnapshot =
                serde_json::from_str(&json).with_context(|| format!("corrupt room {id}"))?;
            // The column is authoritative.
            snapshot.id = Some(id);
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }
}
