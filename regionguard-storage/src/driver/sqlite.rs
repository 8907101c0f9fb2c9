use super::RegionDriver;
use crate::error::StorageResult;
use crate::migration::Migrator;
use parking_lot::Mutex;
use regionguard_types::WorldId;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

/// Stores one row per world in a SQLite database.
///
/// The schema version is duplicated into its own column so operators can
/// see which worlds still need migrating without parsing documents.
pub struct SqliteDriver {
    conn: Mutex<Connection>,
}

impl SqliteDriver {
    /// Opens (or creates) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Opens an in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS region_documents (
                world TEXT PRIMARY KEY,
                schema_version INTEGER NOT NULL,
                document TEXT NOT NULL
            );
            ",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Stored schema version per world, from the version column.
    pub fn versions(&self) -> StorageResult<Vec<(String, u32)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT world, schema_version FROM region_documents ORDER BY world")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?;
        Ok(rows.collect::<Result<_, _>>()?)
    }
}

impl RegionDriver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn read(&self, world: &WorldId) -> StorageResult<Option<Value>> {
        let conn = self.conn.lock();
        let text: Option<String> = conn
            .query_row(
                "SELECT document FROM region_documents WHERE world = ?1",
                params![world.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn write(&self, world: &WorldId, document: &Value) -> StorageResult<()> {
        let version = Migrator::version_of(document)?;
        let text = serde_json::to_string(document)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO region_documents (world, schema_version, document) VALUES (?1, ?2, ?3)
             ON CONFLICT(world) DO UPDATE SET schema_version = excluded.schema_version, document = excluded.document",
            params![world.as_str(), version, text],
        )?;
        Ok(())
    }

    fn delete(&self, world: &WorldId) -> StorageResult<bool> {
        let conn = self.conn.lock();
        let n = conn.execute("DELETE FROM region_documents WHERE world = ?1", params![world.as_str()])?;
        Ok(n > 0)
    }

    fn worlds(&self) -> StorageResult<Vec<WorldId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT world FROM region_documents ORDER BY world")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut worlds = Vec::with_capacity(names.len());
        for name in names {
            match WorldId::new(name.clone()) {
                Ok(world) => worlds.push(world),
                Err(e) => warn!(world = %name, error = %e, "Skipping row with invalid world name"),
            }
        }
        Ok(worlds)
    }
}
