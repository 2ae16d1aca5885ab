use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use uuid::Uuid;

use crate::error::StoreResult;

/// One registered artifact version
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRecord {
    pub name: String,
    pub version: u32,
    pub artifact_type: String,
    pub description: String,
    pub file_name: String,
    pub digest: String,
    pub size_bytes: u64,
    pub run_id: String,
    pub created_at: String,
}

impl ArtifactRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let version: i64 = row.get(1)?;
        let size_bytes: i64 = row.get(6)?;
        Ok(Self {
            name: row.get(0)?,
            version: version as u32,
            artifact_type: row.get(2)?,
            description: row.get(3)?,
            file_name: row.get(4)?,
            digest: row.get(5)?,
            size_bytes: size_bytes as u64,
            run_id: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}

const SELECT_ARTIFACT: &str = "SELECT name, version, artifact_type, description, file_name, \
     digest, size_bytes, run_id, created_at FROM artifacts";

/// SQLite index of artifact versions and runs, kept at `<root>/meta.db`.
pub struct ArtifactIndex {
    conn: Connection,
}

impl ArtifactIndex {
    pub fn open_at_root<P: AsRef<Path>>(root: P) -> StoreResult<Self> {
        std::fs::create_dir_all(root.as_ref())?;
        let conn = Connection::open(root.as_ref().join("meta.db"))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS artifacts (
                name          TEXT NOT NULL,
                version       INTEGER NOT NULL,
                artifact_type TEXT NOT NULL,
                description   TEXT NOT NULL,
                file_name     TEXT NOT NULL,
                digest        TEXT NOT NULL,
                size_bytes    INTEGER NOT NULL,
                run_id        TEXT NOT NULL,
                created_at    TEXT NOT NULL,
                PRIMARY KEY (name, version)
            );
            CREATE TABLE IF NOT EXISTS runs (
                run_id       TEXT PRIMARY KEY,
                job_type     TEXT NOT NULL,
                config_json  TEXT NOT NULL,
                status       TEXT,
                started_at   TEXT NOT NULL,
                finished_at  TEXT
            );
            "#,
        )?;
        Ok(Self { conn })
    }

    // Artifacts
    pub fn latest(&self, name: &str) -> StoreResult<Option<ArtifactRecord>> {
        let sql = format!("{} WHERE name = ?1 ORDER BY version DESC LIMIT 1", SELECT_ARTIFACT);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![name])?;
        match rows.next()? {
            Some(row) => Ok(Some(ArtifactRecord::from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn get_version(&self, name: &str, version: u32) -> StoreResult<Option<ArtifactRecord>> {
        let sql = format!("{} WHERE name = ?1 AND version = ?2", SELECT_ARTIFACT);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![name, version as i64])?;
        match rows.next()? {
            Some(row) => Ok(Some(ArtifactRecord::from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn versions(&self, name: &str) -> StoreResult<Vec<ArtifactRecord>> {
        let sql = format!("{} WHERE name = ?1 ORDER BY version ASC", SELECT_ARTIFACT);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![name])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(ArtifactRecord::from_row(row)?);
        }
        Ok(out)
    }

    pub fn insert_artifact(&self, record: &ArtifactRecord) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO artifacts (name, version, artifact_type, description, file_name, \
             digest, size_bytes, run_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.name,
                record.version as i64,
                record.artifact_type,
                record.description,
                record.file_name,
                record.digest,
                record.size_bytes as i64,
                record.run_id,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    // Runs
    pub fn insert_run(&self, run_id: &Uuid, job_type: &str, started_at: &DateTime<Utc>) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO runs (run_id, job_type, config_json, started_at) VALUES (?1, ?2, '{}', ?3)",
            params![run_id.to_string(), job_type, started_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn run_config(&self, run_id: &Uuid) -> StoreResult<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare("SELECT config_json FROM runs WHERE run_id = ?1")?;
        let mut rows = stmt.query(params![run_id.to_string()])?;
        match rows.next()? {
            Some(row) => {
                let raw: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => Ok(None),
        }
    }

    pub fn set_run_config(&self, run_id: &Uuid, config: &serde_json::Value) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE runs SET config_json = ?2 WHERE run_id = ?1",
            params![run_id.to_string(), serde_json::to_string(config)?],
        )?;
        Ok(())
    }

    pub fn finish_run(&self, run_id: &Uuid, status: &str, finished_at: &DateTime<Utc>) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE runs SET status = ?2, finished_at = ?3 WHERE run_id = ?1",
            params![run_id.to_string(), status, finished_at.to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn run_status(&self, run_id: &Uuid) -> StoreResult<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT status FROM runs WHERE run_id = ?1")?;
        let mut rows = stmt.query(params![run_id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(row.get(0)?),
            None => Ok(None),
        }
    }
}
