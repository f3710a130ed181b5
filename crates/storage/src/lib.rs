use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use shared::domain::{AttendeeTotal, ConfirmationRecord, PartySize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    /// Opens (creating when missing) the database behind `database_url`,
    /// which may also be a bare file path.
    pub async fn new(database_url: &str) -> Result<Self> {
        let database_url = normalize_database_url(database_url);
        ensure_sqlite_parent_dir_exists(&database_url)?;

        let connect_options =
            SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
        // Every connection to `sqlite::memory:` opens its own database.
        let max_connections = if is_memory_url(&database_url) { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS confirmations (
                confirmation_id INTEGER PRIMARY KEY AUTOINCREMENT,
                recorded_at     TEXT NOT NULL,
                party_size      INTEGER NOT NULL CHECK (party_size >= 1)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure confirmations table exists")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_flags (
                flag_key   TEXT PRIMARY KEY,
                flag_value INTEGER NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure local_flags table exists")?;

        Ok(())
    }

    pub async fn record_confirmation(&self, party_size: PartySize) -> Result<ConfirmationRecord> {
        let recorded_at = Utc::now();
        sqlx::query("INSERT INTO confirmations (recorded_at, party_size) VALUES (?, ?)")
            .bind(recorded_at)
            .bind(i64::from(party_size.get()))
            .execute(&self.pool)
            .await
            .context("failed to insert confirmation")?;
        Ok(ConfirmationRecord {
            recorded_at,
            party_size,
        })
    }

    pub async fn list_confirmations(&self) -> Result<Vec<ConfirmationRecord>> {
        let rows = sqlx::query(
            "SELECT recorded_at, party_size FROM confirmations ORDER BY confirmation_id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list confirmations")?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let recorded_at: DateTime<Utc> = row.try_get("recorded_at")?;
            let raw_size: i64 = row.try_get("party_size")?;
            let Some(party_size) = u32::try_from(raw_size).ok().and_then(PartySize::new) else {
                bail!("stored party size {raw_size} is out of range");
            };
            records.push(ConfirmationRecord {
                recorded_at,
                party_size,
            });
        }
        Ok(records)
    }

    pub async fn total_attendees(&self) -> Result<AttendeeTotal> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(party_size), 0) FROM confirmations")
            .fetch_one(&self.pool)
            .await
            .context("failed to sum confirmations")?;
        AttendeeTotal::try_from(total).with_context(|| format!("negative attendee total {total}"))
    }

    pub async fn get_flag(&self, key: &str) -> Result<bool> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT flag_value FROM local_flags WHERE flag_key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .with_context(|| format!("failed to read flag '{key}'"))?;
        Ok(value.unwrap_or(0) != 0)
    }

    pub async fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO local_flags (flag_key, flag_value) VALUES (?, ?)
            ON CONFLICT(flag_key) DO UPDATE SET
                flag_value = excluded.flag_value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(i64::from(value))
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write flag '{key}'"))?;
        Ok(())
    }
}

/// Accepts a bare file path or any `sqlite:` form and returns a URL sqlx can
/// open. Memory URLs and URLs with a scheme are kept as they are.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();
    if raw_database_url.is_empty()
        || is_memory_url(raw_database_url)
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    let path = raw_database_url
        .strip_prefix("sqlite:")
        .unwrap_or(raw_database_url)
        .replace('\\', "/");
    format!("sqlite://{path}")
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_file_path(database_url) else {
        return Ok(());
    };
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })
}

fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
