use std::collections::BTreeMap;

use chrono::NaiveDate;
use tokio::sync::watch;

use crate::core::views::group_by_due_day;
use crate::core::{TaskId, TaskWithCategory};
use crate::error::StoreResult;
use crate::store::SqliteStore;

#[derive(Debug, Clone)]
pub enum Message {
    StoreChanged,
    SelectDay(NaiveDate),
    SetCompleted(TaskId, bool),
    Delete(TaskId),
}

/// State behind the calendar screen: dated tasks grouped by local calendar
/// day, plus the currently selected day.
pub struct CalendarView {
    store: SqliteStore,
    user_id: String,
    revision: watch::Receiver<u64>,
    selected_day: NaiveDate,
    buckets: BTreeMap<NaiveDate, Vec<TaskWithCategory>>,
}

impl CalendarView {
    pub fn open(store: &SqliteStore, user_id: impl Into<String>) -> StoreResult<Self> {
        Self::open_at(store, user_id, chrono::Local::now().date_naive())
    }

    pub fn open_at(
        store: &SqliteStore,
        user_id: impl Into<String>,
        selected_day: NaiveDate,
    ) -> StoreResult<Self> {
        let mut view = Self {
            store: store.clone(),
            user_id: user_id.into(),
            revision: store.subscribe(),
            selected_day,
            buckets: BTreeMap::new(),
        };
        view.refresh()?;
        Ok(view)
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.selected_day
    }

    pub fn tasks_by_day(&self) -> &BTreeMap<NaiveDate, Vec<TaskWithCategory>> {
        &self.buckets
    }

    /// Tasks due on the given day; a day with no tasks yields an empty
    /// list, not an error.
    pub fn tasks_on(&self, day: NaiveDate) -> &[TaskWithCategory] {
        self.buckets.get(&day).map_or(&[], Vec::as_slice)
    }

    pub fn tasks_for_selected_day(&self) -> &[TaskWithCategory] {
        self.tasks_on(self.selected_day)
    }

    pub async fn changed(&mut self) -> bool {
        self.revision.changed().await.is_ok()
    }

    pub fn update(&mut self, message: Message) -> StoreResult<()> {
        match message {
            Message::StoreChanged => self.refresh()?,
            Message::SelectDay(day) => self.selected_day = day,
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
        let dated = self.store.tasks_with_due_date(&self.user_id)?;
        self.buckets = group_by_due_day(&dated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NewTask;

    fn dated_task(title: &str, y: i32, m: u32, d: u32, h: u32, min: u32) -> NewTask {
        let mut t = NewTask::new(title, "u1");
        t.due_date = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0);
        t
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_times_land_in_one_bucket() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_task(&dated_task("Late", 2024, 5, 1, 23, 59))
            .unwrap();
        store
            .insert_task(&dated_task("Early", 2024, 5, 1, 0, 1))
            .unwrap();
        store.insert_task(&NewTask::new("Undated", "u1")).unwrap();

        let view = CalendarView::open_at(&store, "u1", day(2024, 5, 1)).unwrap();
        assert_eq!(view.tasks_by_day().len(), 1);
        assert_eq!(view.tasks_for_selected_day().len(), 2);
    }

    #[test]
    fn selecting_an_empty_day_yields_no_tasks() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_task(&dated_task("Only", 2024, 5, 1, 12, 0))
            .unwrap();

        let mut view = CalendarView::open_at(&store, "u1", day(2024, 5, 1)).unwrap();
        view.update(Message::SelectDay(day(2024, 5, 2))).unwrap();
        assert!(view.tasks_for_selected_day().is_empty());
        assert!(!view.tasks_by_day().contains_key(&day(2024, 5, 2)));
    }

    #[test]
    fn deleting_the_last_task_of_a_day_drops_the_bucket() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .insert_task(&dated_task("Only", 2024, 5, 1, 12, 0))
            .unwrap();

        let mut view = CalendarView::open_at(&store, "u1", day(2024, 5, 1)).unwrap();
        view.update(Message::Delete(id)).unwrap();
        assert!(view.tasks_by_day().is_empty());
    }

    #[test]
    fn completion_stays_visible_in_the_day_bucket() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .insert_task(&dated_task("Done today", 2024, 5, 1, 12, 0))
            .unwrap();

        let mut view = CalendarView::open_at(&store, "u1", day(2024, 5, 1)).unwrap();
        view.update(Message::SetCompleted(id, true)).unwrap();
        let bucket = view.tasks_for_selected_day();
        assert_eq!(bucket.len(), 1);
        assert!(bucket[0].task.completed);
    }
}
