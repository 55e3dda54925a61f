/*
[INPUT]:  schema.sql, server task snapshots, local order changes
[OUTPUT]: SQLite-backed OfflineStore mirroring the user's remote tasks
[POS]:    Persistence layer - local copy read when the server is unreachable
[UPDATE]: When schema.sql or the Task shape changes
*/

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;
use taskr_client::Task;

const DB_FILE: &str = "offline.db";

const SELECT_COLUMNS: &str = "SELECT remote_id, user_id, title, description, priority, sort_order, is_completed, is_deleted, due_date, completed_at, created_at, updated_at FROM tasks";

const PRIORITY_RANK: &str =
    "CASE priority WHEN 'HIGH' THEN 0 WHEN 'MEDIUM' THEN 1 WHEN 'LOW' THEN 2 ELSE 3 END";

pub struct OfflineStore {
    pool: r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>,
}

impl OfflineStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = r2d2_sqlite::SqliteConnectionManager::file(path).with_init(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            Ok(())
        });

        let pool = r2d2::Pool::new(manager).context("create sqlite pool")?;
        let store = Self { pool };
        store.run_migrations()?;
        Ok(store)
    }

    /// Store at `<data_dir>/offline.db`
    pub fn in_data_dir(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("create data directory {}", data_dir.display()))?;
        Self::new(data_dir.join(DB_FILE))
    }

    /// Make the mirror match a fresh server snapshot for one user
    pub fn replace_for_user(&self, user_id: i64, tasks: &[Task]) -> Result<()> {
        let mut conn = self.pool.get().context("get sqlite connection")?;
        let tx = conn.transaction().context("begin transaction")?;

        tx.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])
            .context("clear user tasks")?;
        for task in tasks {
            upsert_with(&tx, task)?;
        }

        tx.commit().context("commit offline snapshot")?;
        tracing::debug!(user_id, count = tasks.len(), "offline mirror replaced");
        Ok(())
    }

    /// Insert a task or overwrite the row with the same remote id
    pub fn upsert(&self, task: &Task) -> Result<()> {
        let conn = self.pool.get().context("get sqlite connection")?;
        upsert_with(&conn, task)
    }

    /// Not completed, not deleted; High first, then by order
    pub fn active_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "{SELECT_COLUMNS} WHERE user_id = ?1 AND is_completed = 0 AND is_deleted = 0 ORDER BY {PRIORITY_RANK}, sort_order, remote_id"
            ),
            user_id,
        )
    }

    /// Completed and not deleted, newest completion first
    pub fn completed_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!(
                "{SELECT_COLUMNS} WHERE user_id = ?1 AND is_completed = 1 AND is_deleted = 0 ORDER BY completed_at IS NULL, completed_at DESC, remote_id DESC"
            ),
            user_id,
        )
    }

    /// Every mirrored row for the user, soft-deleted ones included
    pub fn all_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        self.query_tasks(
            &format!("{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY remote_id"),
            user_id,
        )
    }

    /// Returns false when no row has `remote_id`
    pub fn set_order(&self, remote_id: i64, order: i64) -> Result<bool> {
        let conn = self.pool.get().context("get sqlite connection")?;
        let updated = conn
            .execute(
                "UPDATE tasks SET sort_order = ?1 WHERE remote_id = ?2",
                params![order, remote_id],
            )
            .context("update task order")?;
        Ok(updated > 0)
    }

    pub fn clear_user(&self, user_id: i64) -> Result<()> {
        let conn = self.pool.get().context("get sqlite connection")?;
        conn.execute("DELETE FROM tasks WHERE user_id = ?1", params![user_id])
            .context("clear user tasks")?;
        Ok(())
    }

    fn query_tasks(&self, sql: &str, user_id: i64) -> Result<Vec<Task>> {
        let conn = self.pool.get().context("get sqlite connection")?;
        let mut stmt = conn.prepare(sql).context("prepare task query")?;
        let rows = stmt
            .query_map(params![user_id], |row| TaskRow::from_row(row))
            .context("query tasks")?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(Task::try_from(row.context("read task row")?)?);
        }
        Ok(tasks)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.pool.get().context("get sqlite connection")?;
        conn.execute_batch(include_str!("schema.sql"))
            .context("run offline migrations")?;
        Ok(())
    }
}

fn upsert_with(conn: &Connection, task: &Task) -> Result<()> {
    let priority = encode_enum(&task.priority)?;
    conn.execute(
        "INSERT INTO tasks (remote_id, user_id, title, description, priority, sort_order, is_completed, is_deleted, due_date, completed_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(remote_id) DO UPDATE SET
            user_id = excluded.user_id,
            title = excluded.title,
            description = excluded.description,
            priority = excluded.priority,
            sort_order = excluded.sort_order,
            is_completed = excluded.is_completed,
            is_deleted = excluded.is_deleted,
            due_date = excluded.due_date,
            completed_at = excluded.completed_at,
            created_at = excluded.created_at,
            updated_at = excluded.updated_at",
        params![
            task.id,
            task.user_id,
            task.title,
            task.description,
            priority,
            task.order,
            task.is_completed,
            task.is_deleted,
            task.due_date,
            task.completed_at,
            task.created_at,
            task.updated_at
        ],
    )
    .context("upsert task")?;
    Ok(())
}

struct TaskRow {
    remote_id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    priority: String,
    sort_order: i64,
    is_completed: bool,
    is_deleted: bool,
    due_date: Option<String>,
    completed_at: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            remote_id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            priority: row.get(4)?,
            sort_order: row.get(5)?,
            is_completed: row.get(6)?,
            is_deleted: row.get(7)?,
            due_date: row.get(8)?,
            completed_at: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = anyhow::Error;

    fn try_from(row: TaskRow) -> Result<Self> {
        Ok(Self {
            id: row.remote_id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            priority: decode_enum(&row.priority)?,
            order: row.sort_order,
            is_completed: row.is_completed,
            is_deleted: row.is_deleted,
            due_date: row.due_date,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn encode_enum<T: Serialize>(value: &T) -> Result<String> {
    let serialized = serde_json::to_value(value).context("serialize enum")?;
    serialized
        .as_str()
        .map(str::to_string)
        .context("enum serialized as non-string")
}

fn decode_enum<T: DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string())).context("deserialize enum")
}
