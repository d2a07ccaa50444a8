//! `SQLite` implementation of [`AutomationStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};

use ordercron_app::ports::AutomationStore;
use ordercron_domain::automation::{
    AutomationPatch, AutomationRecord, DeleteOutcome, NewAutomation,
};
use ordercron_domain::error::OrderCronError;
use ordercron_domain::id::AutomationId;
use ordercron_domain::order::OrderSnapshot;
use ordercron_domain::time::{self, Timestamp, format_instant, parse_instant};

use crate::error::StorageError;

fn decode_error<E>(err: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(err))
}

fn instant_column(row: &SqliteRow, column: &str) -> Result<Option<Timestamp>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| parse_instant(&s).map_err(decode_error))
        .transpose()
}

/// `NULL` or blank snapshots read back as an empty list.
fn snapshot_column(row: &SqliteRow) -> Result<Vec<OrderSnapshot>, sqlx::Error> {
    let raw: Option<String> = row.try_get("orders_snapshot")?;
    match raw.as_deref().map(str::trim) {
        None | Some("" | "null") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(decode_error),
    }
}

fn encode_instant(ts: Option<Timestamp>) -> Option<String> {
    ts.map(format_instant)
}

struct Wrapper(AutomationRecord);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<AutomationRecord> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let created_at: String = row.try_get("created_at")?;
        let interval_days: i64 = row.try_get("interval_days")?;

        Ok(Self(AutomationRecord {
            id: AutomationId::new(id).map_err(decode_error)?,
            label: row.try_get("label")?,
            schedule: row.try_get("schedule")?,
            action: row.try_get("action")?,
            search_query: row.try_get("search_query")?,
            orders_snapshot: snapshot_column(row)?,
            created_at: parse_instant(&created_at).map_err(decode_error)?,
            last_run: instant_column(row, "last_run")?,
            next_run: instant_column(row, "next_run")?,
            start_at: instant_column(row, "start_at")?,
            end_at: instant_column(row, "end_at")?,
            enabled: row.try_get("enabled")?,
            interval_days: u32::try_from(interval_days).map_err(decode_error)?,
        }))
    }
}

/// `SQLite`-backed automation store.
#[derive(Clone)]
pub struct SqliteAutomationStore {
    pool: SqlitePool,
}

impl SqliteAutomationStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: i64) -> Result<Option<AutomationRecord>, StorageError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM automations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(Wrapper::maybe(row))
    }
}

/// Append `column = ?` for every supplied field of a non-empty patch.
fn push_assignments(
    qb: &mut QueryBuilder<'_, Sqlite>,
    patch: AutomationPatch,
) -> Result<(), StorageError> {
    let mut set = qb.separated(", ");

    if let Some(label) = patch.label {
        set.push("label = ").push_bind_unseparated(label);
    }
    if let Some(schedule) = patch.schedule {
        set.push("schedule = ").push_bind_unseparated(schedule);
    }
    if let Some(action) = patch.action {
        set.push("action = ").push_bind_unseparated(action);
    }
    if let Some(query) = patch.search_query {
        set.push("search_query = ").push_bind_unseparated(query);
    }
    if let Some(orders) = patch.orders_snapshot {
        set.push("orders_snapshot = ")
            .push_bind_unseparated(serde_json::to_string(&orders)?);
    }
    for (column, value) in [
        ("last_run", patch.last_run),
        ("next_run", patch.next_run),
        ("start_at", patch.start_at),
        ("end_at", patch.end_at),
    ] {
        if let Some(ts) = value {
            set.push(format_args!("{column} = "))
                .push_bind_unseparated(encode_instant(ts));
        }
    }
    if let Some(enabled) = patch.enabled {
        set.push("enabled = ").push_bind_unseparated(enabled);
    }
    if let Some(days) = patch.interval_days {
        set.push("interval_days = ")
            .push_bind_unseparated(i64::from(days));
    }
    Ok(())
}

impl AutomationStore for SqliteAutomationStore {
    async fn save(&self, automation: NewAutomation) -> Result<AutomationRecord, OrderCronError> {
        let orders_json =
            serde_json::to_string(&automation.orders_snapshot).map_err(StorageError::from)?;

        let result = sqlx::query(
            "INSERT INTO automations (label, schedule, action, search_query, orders_snapshot, created_at, last_run, next_run, start_at, end_at, enabled, interval_days) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&automation.label)
        .bind(&automation.schedule)
        .bind(&automation.action)
        .bind(&automation.search_query)
        .bind(&orders_json)
        .bind(format_instant(time::now()))
        .bind(encode_instant(automation.last_run))
        .bind(encode_instant(automation.next_run))
        .bind(encode_instant(automation.start_at))
        .bind(encode_instant(automation.end_at))
        .bind(automation.enabled)
        .bind(i64::from(automation.interval_days))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        let id = result.last_insert_rowid();
        self.fetch(id)
            .await?
            .ok_or_else(|| StorageError::from(sqlx::Error::RowNotFound).into())
    }

    async fn update(
        &self,
        id: AutomationId,
        patch: AutomationPatch,
    ) -> Result<Option<AutomationId>, OrderCronError> {
        if patch.is_empty() {
            return Ok(None);
        }
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE automations SET ");
        push_assignments(&mut qb, patch)?;
        qb.push(" WHERE id = ").push_bind(id.get());

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok((result.rows_affected() > 0).then_some(id))
    }

    async fn get(&self, id: AutomationId) -> Result<Option<AutomationRecord>, OrderCronError> {
        Ok(self.fetch(id.get()).await?)
    }

    async fn list(&self) -> Result<Vec<AutomationRecord>, OrderCronError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM automations ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn delete(&self, id: AutomationId) -> Result<DeleteOutcome, OrderCronError> {
        let result = sqlx::query("DELETE FROM automations WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(DeleteOutcome {
            deleted: result.rows_affected(),
        })
    }
}
