use std::collections::HashSet;

use tokio::sync::watch;

use crate::core::views::{distinct_categories, filter_by_categories, sort_for_display};
use crate::core::{Category, CategoryId, TaskId, TaskWithCategory};
use crate::error::StoreResult;
use crate::store::SqliteStore;

#[derive(Debug, Clone)]
pub enum Message {
    /// The store's revision changed; re-query and re-derive.
    StoreChanged,
    /// Toggle one category in or out of the filter selection.
    ToggleCategory(CategoryId),
    ClearFilter,
    SetCompleted(TaskId, bool),
    Delete(TaskId),
}

/// State behind the main task list: the ordered task snapshot, the category
/// filter selection, and the views derived from the two.
pub struct TaskListView {
    store: SqliteStore,
    user_id: String,
    revision: watch::Receiver<u64>,
    selected_category_ids: HashSet<CategoryId>,
    tasks: Vec<TaskWithCategory>,
    filtered: Vec<TaskWithCategory>,
    categories: Vec<Category>,
}

impl TaskListView {
    pub fn open(store: &SqliteStore, user_id: impl Into<String>) -> StoreResult<Self> {
        let mut view = Self {
            store: store.clone(),
            user_id: user_id.into(),
            revision: store.subscribe(),
            selected_category_ids: HashSet::new(),
            tasks: Vec::new(),
            filtered: Vec::new(),
            categories: Vec::new(),
        };
        view.refresh()?;
        Ok(view)
    }

    /// Ordered, unfiltered tasks.
    pub fn tasks(&self) -> &[TaskWithCategory] {
        &self.tasks
    }

    /// Ordered tasks after the category filter.
    pub fn filtered_tasks(&self) -> &[TaskWithCategory] {
        &self.filtered
    }

    /// Categories referenced by at least one task, name-sorted. This is the
    /// filter menu's source, so a brand-new unused category will not show
    /// here until some task is assigned to it.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn selected_category_ids(&self) -> &HashSet<CategoryId> {
        &self.selected_category_ids
    }

    /// Wait for the next store revision. Resolves to `false` once the store
    /// is gone.
    pub async fn changed(&mut self) -> bool {
        self.revision.changed().await.is_ok()
    }

    pub fn update(&mut self, message: Message) -> StoreResult<()> {
        match message {
            Message::StoreChanged => self.refresh()?,
            Message::ToggleCategory(id) => {
                if !self.selected_category_ids.remove(&id) {
                    self.selected_category_ids.insert(id);
                }
                self.rederive();
            }
            Message::ClearFilter => {
                self.selected_category_ids.clear();
                self.rederive();
            }
            Message::SetCompleted(id, completed) => {
                if let Some(found) = self.store.task_by_id(id)? {
                    let mut task = found.task;
                    task.completed = completed;
                    self.store.update_task(&task)?;
                }
                self.refresh()?;
            }
            Message::Delete(id) => {
                self.store.delete_task(id)?;
                self.refresh()?;
            }
        }
        Ok(())
    }

    fn refresh(&mut self) -> StoreResult<()> {
        self.tasks = sort_for_display(self.store.tasks_for_user(&self.user_id)?);
        self.rederive();
        Ok(())
    }

    fn rederive(&mut self) {
        self.filtered = filter_by_categories(&self.tasks, &self.selected_category_ids);
        self.categories = distinct_categories(&self.tasks);
    }
}
