use chrono::NaiveDateTime;
use tokio::sync::watch;

use crate::core::form::FormValidity;
use crate::core::{Category, CategoryId, NewCategory, NewTask, TaskId};
use crate::error::StoreResult;
use crate::store::SqliteStore;

#[derive(Debug, Clone)]
pub enum Message {
    StoreChanged,
    TitleChanged(String),
    DueDateChanged(Option<NaiveDateTime>),
    NotesChanged(String),
    CategorySelected(Option<CategoryId>),
    OpenNewCategoryDialog,
    DismissNewCategoryDialog,
}

/// Whether the form creates a task or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    New,
    Edit(TaskId),
}

/// State behind the new-task and edit-task screens. Saving a task is only
/// possible while the title is non-blank; everything else is optional.
pub struct TaskFormView {
    store: SqliteStore,
    user_id: String,
    revision: watch::Receiver<u64>,
    mode: Mode,
    pub title: String,
    pub due_date: Option<NaiveDateTime>,
    pub notes: String,
    pub category_id: Option<CategoryId>,
    new_category_dialog_open: bool,
    categories: Vec<Category>,
}

impl TaskFormView {
    /// Blank form for a new task.
    pub fn new_task(store: &SqliteStore, user_id: impl Into<String>) -> StoreResult<Self> {
        let mut view = Self {
            store: store.clone(),
            user_id: user_id.into(),
            revision: store.subscribe(),
            mode: Mode::New,
            title: String::new(),
            due_date: None,
            notes: String::new(),
            category_id: None,
            new_category_dialog_open: false,
            categories: Vec::new(),
        };
        view.refresh()?;
        Ok(view)
    }

    /// Form pre-filled from an existing task. Returns `None` when the task
    /// does not exist.
    pub fn edit_task(
        store: &SqliteStore,
        user_id: impl Into<String>,
        task_id: TaskId,
    ) -> StoreResult<Option<Self>> {
        let Some(existing) = store.task_by_id(task_id)? else {
            return Ok(None);
        };
        let mut view = Self {
            store: store.clone(),
            user_id: user_id.into(),
            revision: store.subscribe(),
            mode: Mode::Edit(task_id),
            title: existing.task.title,
            due_date: existing.task.due_date,
            notes: existing.task.notes,
            category_id: existing.task.category_id,
            new_category_dialog_open: false,
            categories: Vec::new(),
        };
        view.refresh()?;
        Ok(Some(view))
    }

    /// All of the user's categories, for the dropdown. Unlike the filter
    /// menu this list comes from the store, so unused categories do appear.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn new_category_dialog_open(&self) -> bool {
        self.new_category_dialog_open
    }

    pub fn validity(&self) -> FormValidity {
        FormValidity::of_title(&self.title)
    }

    pub fn can_save(&self) -> bool {
        self.validity().can_save()
    }

    pub async fn changed(&mut self) -> bool {
        self.revision.changed().await.is_ok()
    }

    pub fn update(&mut self, message: Message) -> StoreResult<()> {
        match message {
            Message::StoreChanged => self.refresh()?,
            Message::TitleChanged(title) => self.title = title,
            Message::DueDateChanged(due) => self.due_date = due,
            Message::NotesChanged(notes) => self.notes = notes,
            Message::CategorySelected(id) => self.category_id = id,
            Message::OpenNewCategoryDialog => self.new_category_dialog_open = true,
            Message::DismissNewCategoryDialog => self.new_category_dialog_open = false,
        }
        Ok(())
    }

    /// Inline new-category sub-flow: create, select the fresh id, close the
    /// dialog. A blank name is ignored.
    pub fn create_category(&mut self, name: &str, color: u32) -> StoreResult<()> {
        if name.trim().is_empty() {
            return Ok(());
        }
        let id = self
            .store
            .insert_category(&NewCategory::new(name, color, self.user_id.clone()))?;
        self.category_id = Some(id);
        self.new_category_dialog_open = false;
        self.refresh()
    }

    /// Persist the form. Returns the saved task's id, or `None` when the
    /// form is not saveable; an unsaveable form never touches the store.
    pub fn save(&self) -> StoreResult<Option<TaskId>> {
        if !self.can_save() {
            return Ok(None);
        }
        match self.mode {
            Mode::New => {
                let mut task = NewTask::new(self.title.clone(), self.user_id.clone());
                task.due_date = self.due_date;
                task.notes = self.notes.clone();
                task.category_id = self.category_id;
                let id = self.store.insert_task(&task)?;
                Ok(Some(id))
            }
            Mode::Edit(id) => {
                // Re-fetch so id, creation time, completion, priority, and
                // owner survive the edit untouched.
                let Some(existing) = self.store.task_by_id(id)? else {
                    return Ok(None);
                };
                let mut task = existing.task;
                task.title = self.title.clone();
                task.due_date = self.due_date;
                task.notes = self.notes.clone();
                task.category_id = self.category_id;
                self.store.update_task(&task)?;
                Ok(Some(id))
            }
        }
    }

    fn refresh(&mut self) -> StoreResult<()> {
        self.categories = self.store.categories_for_user(&self.user_id)?;
        Ok(())
    }
}
