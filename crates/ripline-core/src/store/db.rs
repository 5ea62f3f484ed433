//! SQLite-backed pipeline database.
//!
//! Handles connection, migrations, and timestamp helpers. Record CRUD lives
//! in the sibling modules.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS media_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        name TEXT NOT NULL,
        safe_name TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL DEFAULT 'active',
        current_stage TEXT NOT NULL DEFAULT 'rip',
        stage_status TEXT NOT NULL DEFAULT 'pending',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS seasons (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL REFERENCES media_items(id),
        number INTEGER NOT NULL,
        current_stage TEXT NOT NULL DEFAULT 'rip',
        stage_status TEXT NOT NULL DEFAULT 'pending',
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL,
        UNIQUE(item_id, number)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        media_item_id INTEGER NOT NULL REFERENCES media_items(id),
        season_id INTEGER REFERENCES seasons(id),
        disc INTEGER,
        stage TEXT NOT NULL,
        status TEXT NOT NULL,
        input_dir TEXT,
        output_dir TEXT,
        progress INTEGER NOT NULL DEFAULT 0,
        started_at INTEGER,
        completed_at INTEGER,
        error_message TEXT,
        created_at INTEGER NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transcode_files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id INTEGER NOT NULL REFERENCES jobs(id),
        relative_path TEXT NOT NULL,
        status TEXT NOT NULL,
        input_size INTEGER NOT NULL DEFAULT 0,
        output_size INTEGER NOT NULL DEFAULT 0,
        progress INTEGER NOT NULL DEFAULT 0,
        duration_secs REAL NOT NULL DEFAULT 0,
        started_at INTEGER,
        completed_at INTEGER,
        error_message TEXT,
        UNIQUE(job_id, relative_path)
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS log_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job_id INTEGER NOT NULL REFERENCES jobs(id),
        level TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
    "#,
];

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the pipeline database. Cheap to clone (shares the pool).
///
/// The default file lives under the XDG state directory:
/// `~/.local/state/ripline/pipeline.db`.
#[derive(Debug, Clone)]
pub struct PipelineDb {
    pub(crate) pool: Pool<Sqlite>,
}

impl PipelineDb {
    /// Default database location.
    pub fn default_path() -> Result<PathBuf> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("ripline")?;
        Ok(xdg_dirs.get_state_home().join("ripline").join("pipeline.db"))
    }

    /// Open (or create) the default database and run migrations.
    pub async fn open_default() -> Result<Self> {
        Self::open_at(Self::default_path()?).await
    }

    /// Open (or create) the database at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect(&uri)
            .await?;
        let db = PipelineDb { pool };
        db.migrate().await?;
        tracing::debug!(path = %path.display(), "pipeline database opened");
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Current time as Unix seconds (for DB timestamps).
pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
/// Open an in-memory database for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<PipelineDb> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = PipelineDb { pool };
    db.migrate().await?;
    Ok(db)
}
