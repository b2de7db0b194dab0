//! # Skillforge Database
//!
//! Single SQLite database for all persistent state, created on first
//! open at `.skillforge/skillforge.db`.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Database manager for all Skillforge state
pub struct SkillforgeDb {
    conn: Arc<Mutex<Connection>>,
}

impl SkillforgeDb {
    /// Open or create the database at `.skillforge/skillforge.db`
    pub fn open() -> Result<Self> {
        Self::open_at(".skillforge/skillforge.db")
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn =
            Connection::open(path.as_ref()).context("Failed to open skillforge database")?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Get a shared connection for use by other modules
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Run schema migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            self.migrate_v1(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [1],
            )?;
        }

        Ok(())
    }

    /// Migration to version 1 - complete schema
    fn migrate_v1(&self, conn: &Connection) -> Result<()> {
        // Analysis cache: serialized AnalysisResult keyed by content hash
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS analysis_cache (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_expires ON analysis_cache(expires_at)",
            [],
        )?;

        tracing::info!(
            "SkillforgeDb initialized with schema version {}",
            SCHEMA_VERSION
        );

        Ok(())
    }
}
