//! Embedded SQLite store for tasks and categories.
//!
//! Every read and write is scoped by the owning user's id. Writes bump a
//! revision counter published on a watch channel; view states subscribe to
//! it and re-query on change, and dropping the receiver tears the
//! subscription down.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::watch;

use crate::core::{Category, CategoryId, NewCategory, NewTask, Task, TaskId, TaskWithCategory};
use crate::error::StoreResult;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    color INTEGER NOT NULL,
    owner_id TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    due_date TEXT,
    priority INTEGER NOT NULL DEFAULT 1,
    completed INTEGER NOT NULL DEFAULT 0,
    category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
    notes TEXT NOT NULL DEFAULT '',
    owner_id TEXT NOT NULL
);
";

const TASK_COLUMNS: &str = "t.id, t.title, t.created_at, t.due_date, t.priority, t.completed, \
                            t.category_id, t.notes, t.owner_id, \
                            c.id, c.name, c.color, c.owner_id";

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    revision: watch::Sender<u64>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        // ON DELETE SET NULL only fires with foreign keys enabled.
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        let (revision, _) = watch::channel(0);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            revision,
        })
    }

    /// Subscribe to data changes. The receiver yields a new revision after
    /// every successful write; drop it to unsubscribe.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    // --- Tasks ---

    pub fn tasks_for_user(&self, owner_id: &str) -> StoreResult<Vec<TaskWithCategory>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             LEFT JOIN categories c ON t.category_id = c.id \
             WHERE t.owner_id = ?1 ORDER BY t.id"
        ))?;
        let rows = stmt.query_map(params![owner_id], row_to_task_with_category)?;
        rows.collect::<Result<_, _>>().map_err(Into::into)
    }

    pub fn tasks_with_due_date(&self, owner_id: &str) -> StoreResult<Vec<TaskWithCategory>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             LEFT JOIN categories c ON t.category_id = c.id \
             WHERE t.owner_id = ?1 AND t.due_date IS NOT NULL ORDER BY t.id"
        ))?;
        let rows = stmt.query_map(params![owner_id], row_to_task_with_category)?;
        rows.collect::<Result<_, _>>().map_err(Into::into)
    }

    pub fn task_by_id(&self, id: TaskId) -> StoreResult<Option<TaskWithCategory>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t \
             LEFT JOIN categories c ON t.category_id = c.id \
             WHERE t.id = ?1"
        ))?;
        stmt.query_row(params![id], row_to_task_with_category)
            .optional()
            .map_err(Into::into)
    }

    pub fn insert_task(&self, task: &NewTask) -> StoreResult<TaskId> {
        let id = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO tasks (title, created_at, due_date, priority, completed, \
                                    category_id, notes, owner_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    task.title,
                    task.created_at,
                    task.due_date,
                    task.priority,
                    task.completed,
                    task.category_id,
                    task.notes,
                    task.owner_id,
                ],
            )?;
            conn.last_insert_rowid()
        };
        log::debug!("inserted task {id} for {}", task.owner_id);
        self.bump_revision();
        Ok(id)
    }

    pub fn update_task(&self, task: &Task) -> StoreResult<()> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "UPDATE tasks SET title = ?1, created_at = ?2, due_date = ?3, priority = ?4, \
                                  completed = ?5, category_id = ?6, notes = ?7, owner_id = ?8 \
                 WHERE id = ?9",
                params![
                    task.title,
                    task.created_at,
                    task.due_date,
                    task.priority,
                    task.completed,
                    task.category_id,
                    task.notes,
                    task.owner_id,
                    task.id,
                ],
            )?;
        }
        self.bump_revision();
        Ok(())
    }

    pub fn delete_task(&self, id: TaskId) -> StoreResult<()> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        }
        log::debug!("deleted task {id}");
        self.bump_revision();
        Ok(())
    }

    // --- Categories ---

    pub fn categories_for_user(&self, owner_id: &str) -> StoreResult<Vec<Category>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, color, owner_id FROM categories WHERE owner_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                owner_id: row.get(3)?,
            })
        })?;
        rows.collect::<Result<_, _>>().map_err(Into::into)
    }

    pub fn insert_category(&self, category: &NewCategory) -> StoreResult<CategoryId> {
        let id = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO categories (name, color, owner_id) VALUES (?1, ?2, ?3)",
                params![category.name, category.color, category.owner_id],
            )?;
            conn.last_insert_rowid()
        };
        log::debug!("inserted category {id} ({})", category.name);
        self.bump_revision();
        Ok(id)
    }

    /// Delete a category. Tasks referencing it survive with their category
    /// reference nulled out, never cascaded away.
    pub fn delete_category(&self, id: CategoryId) -> StoreResult<()> {
        {
            let conn = self.conn.lock().unwrap();
            conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        }
        log::debug!("deleted category {id}");
        self.bump_revision();
        Ok(())
    }
}

fn row_to_task_with_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskWithCategory> {
    let category = match row.get::<_, Option<CategoryId>>(9)? {
        Some(id) => Some(Category {
            id,
            name: row.get(10)?,
            color: row.get(11)?,
            owner_id: row.get(12)?,
        }),
        None => None,
    };
    Ok(TaskWithCategory {
        task: Task {
            id: row.get(0)?,
            title: row.get(1)?,
            created_at: row.get(2)?,
            due_date: row.get(3)?,
            priority: row.get(4)?,
            completed: row.get(5)?,
            category_id: row.get(6)?,
            notes: row.get(7)?,
            owner_id: row.get(8)?,
        },
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn insert_and_read_back_scoped_by_owner() {
        let store = store();
        store.insert_task(&NewTask::new("Mine", "u1")).unwrap();
        store.insert_task(&NewTask::new("Theirs", "u2")).unwrap();

        let mine = store.tasks_for_user("u1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].task.title, "Mine");
        assert_eq!(store.tasks_for_user("u2").unwrap().len(), 1);
        assert!(store.tasks_for_user("nobody").unwrap().is_empty());
    }

    #[test]
    fn new_task_defaults() {
        let store = store();
        let id = store.insert_task(&NewTask::new("Defaults", "u1")).unwrap();
        let got = store.task_by_id(id).unwrap().unwrap();
        assert_eq!(got.task.priority, 1);
        assert!(!got.task.completed);
        assert!(got.task.due_date.is_none());
        assert!(got.task.category_id.is_none());
        assert!(got.category.is_none());
    }

    #[test]
    fn update_round_trips() {
        let store = store();
        let id = store.insert_task(&NewTask::new("Before", "u1")).unwrap();
        let mut task = store.task_by_id(id).unwrap().unwrap().task;
        task.title = "After".into();
        task.completed = true;
        store.update_task(&task).unwrap();

        let got = store.task_by_id(id).unwrap().unwrap();
        assert_eq!(got.task.title, "After");
        assert!(got.task.completed);
    }

    #[test]
    fn delete_task_removes_it() {
        let store = store();
        let id = store.insert_task(&NewTask::new("Gone", "u1")).unwrap();
        store.delete_task(id).unwrap();
        assert!(store.task_by_id(id).unwrap().is_none());
    }

    #[test]
    fn join_carries_the_category() {
        let store = store();
        let cid = store
            .insert_category(&NewCategory::new("Work", 0xFF2196F3, "u1"))
            .unwrap();
        let mut new = NewTask::new("Report", "u1");
        new.category_id = Some(cid);
        let id = store.insert_task(&new).unwrap();

        let got = store.task_by_id(id).unwrap().unwrap();
        let cat = got.category.unwrap();
        assert_eq!(cat.id, cid);
        assert_eq!(cat.name, "Work");
        assert_eq!(cat.color, 0xFF2196F3);
    }

    #[test]
    fn deleting_a_category_nulls_task_references() {
        let store = store();
        let cid = store
            .insert_category(&NewCategory::new("Doomed", 0xFFFF0000, "u1"))
            .unwrap();
        let mut new = NewTask::new("Survivor", "u1");
        new.category_id = Some(cid);
        let id = store.insert_task(&new).unwrap();

        store.delete_category(cid).unwrap();

        // The task survives, unlinked, and renders as "No Category".
        let got = store.task_by_id(id).unwrap().unwrap();
        assert_eq!(got.task.title, "Survivor");
        assert_eq!(got.task.category_id, None);
        assert!(got.category.is_none());
        assert_eq!(got.category_name(), "No Category");
    }

    #[test]
    fn dated_query_excludes_undated_tasks() {
        let store = store();
        let mut dated = NewTask::new("Dated", "u1");
        dated.due_date = chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0);
        store.insert_task(&dated).unwrap();
        store.insert_task(&NewTask::new("Undated", "u1")).unwrap();

        let got = store.tasks_with_due_date("u1").unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].task.title, "Dated");
    }

    #[tokio::test]
    async fn writes_bump_the_revision() {
        let store = store();
        let mut rev = store.subscribe();
        let before = *rev.borrow_and_update();
        store.insert_task(&NewTask::new("Ping", "u1")).unwrap();
        rev.changed().await.unwrap();
        assert!(*rev.borrow() > before);
    }
}
