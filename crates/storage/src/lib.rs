use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Event, EventDraft, EventId};

const EVENT_COLUMNS: &str =
    "id, name, description, location, starts_at, ends_at, created_at, updated_at";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
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

    /// Events ordered by start time, oldest first.
    pub async fn list_events(&self, offset: i64, limit: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY starts_at ASC, id ASC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("failed to list events")?;

        rows.iter().map(event_from_row).collect()
    }

    pub async fn list_events_starting_after(
        &self,
        after: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE starts_at >= ?
             ORDER BY starts_at ASC, id ASC
             LIMIT ?"
        ))
        .bind(after)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("failed to list upcoming events")?;

        rows.iter().map(event_from_row).collect()
    }

    pub async fn count_events(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await
            .context("failed to count events")?;
        Ok(count)
    }

    pub async fn load_event(&self, event_id: EventId) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?"))
            .bind(event_id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load event {event_id}"))?;

        row.as_ref().map(event_from_row).transpose()
    }

    pub async fn insert_event(&self, draft: &EventDraft) -> Result<Event> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO events (name, description, location, starts_at, ends_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(draft.location.as_deref())
        .bind(draft.starts_at)
        .bind(draft.ends_at)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert event")?;

        event_from_row(&row)
    }

    /// Returns `None` when no event has the given id.
    pub async fn update_event(&self, event_id: EventId, draft: &EventDraft) -> Result<Option<Event>> {
        let row = sqlx::query(&format!(
            "UPDATE events
             SET name = ?, description = ?, location = ?, starts_at = ?, ends_at = ?, updated_at = ?
             WHERE id = ?
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(draft.description.as_deref())
        .bind(draft.location.as_deref())
        .bind(draft.starts_at)
        .bind(draft.ends_at)
        .bind(Utc::now())
        .bind(event_id.0)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update event {event_id}"))?;

        row.as_ref().map(event_from_row).transpose()
    }

    pub async fn delete_event(&self, event_id: EventId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(event_id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete event {event_id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn event_from_row(row: &SqliteRow) -> Result<Event> {
    Ok(Event {
        id: EventId(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        starts_at: row.try_get("starts_at")?,
        ends_at: row.try_get("ends_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
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
