use serde::{Deserialize, Serialize};

/// Store-assigned category identifier (SQLite rowid).
pub type CategoryId = i64;

/// A named, colored label attachable to tasks. Categories are created
/// inline from the task form and never edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Packed ARGB, e.g. 0xFF2196F3.
    pub color: u32,
    pub owner_id: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub color: u32,
    pub owner_id: String,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, color: u32, owner_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color,
            owner_id: owner_id.into(),
        }
    }
}
