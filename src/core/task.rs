use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryId};

/// Store-assigned task identifier (SQLite rowid).
pub type TaskId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub priority: i32,
    pub completed: bool,
    pub category_id: Option<CategoryId>,
    pub notes: String,
    pub owner_id: String,
}

/// Fields supplied when creating a task; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub priority: i32,
    pub completed: bool,
    pub category_id: Option<CategoryId>,
    pub notes: String,
    pub owner_id: String,
}

impl NewTask {
    pub fn new(title: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            created_at: chrono::Local::now().naive_local(),
            due_date: None,
            priority: 1,
            completed: false,
            category_id: None,
            notes: String::new(),
            owner_id: owner_id.into(),
        }
    }
}

/// A task joined with its category, if it has one. Never persisted;
/// recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWithCategory {
    pub task: Task,
    pub category: Option<Category>,
}

impl TaskWithCategory {
    pub fn category_name(&self) -> &str {
        self.category
            .as_ref()
            .map_or("No Category", |c| c.name.as_str())
    }
}
