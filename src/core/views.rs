//! Pure derivations from the task collection to what the screens render.
//!
//! Every function here recomputes wholly from its inputs; nothing is
//! patched incrementally, so a derived view always reflects the latest
//! snapshot of the collection it was computed from.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use super::category::{Category, CategoryId};
use super::task::TaskWithCategory;

/// Total order for the task list:
/// incomplete before completed, then dated before undated, then due date
/// ascending, then id ascending as a deterministic tie-break.
pub fn display_order(a: &TaskWithCategory, b: &TaskWithCategory) -> Ordering {
    a.task
        .completed
        .cmp(&b.task.completed)
        .then_with(|| match (&a.task.due_date, &b.task.due_date) {
            (Some(da), Some(db)) => da.cmp(db),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.task.id.cmp(&b.task.id))
}

/// Sort a snapshot of tasks into display order.
pub fn sort_for_display(mut tasks: Vec<TaskWithCategory>) -> Vec<TaskWithCategory> {
    tasks.sort_by(display_order);
    tasks
}

/// Apply a category filter. An empty selection passes everything through;
/// a non-empty selection keeps only tasks whose category is selected, so
/// uncategorized tasks drop out.
pub fn filter_by_categories(
    tasks: &[TaskWithCategory],
    selected: &HashSet<CategoryId>,
) -> Vec<TaskWithCategory> {
    if selected.is_empty() {
        return tasks.to_vec();
    }
    tasks
        .iter()
        .filter(|t| t.task.category_id.is_some_and(|id| selected.contains(&id)))
        .cloned()
        .collect()
}

/// Group dated tasks by the local calendar day of their due date. Tasks
/// without a due date appear in no bucket; a day with no tasks is absent
/// from the map.
pub fn group_by_due_day(
    tasks: &[TaskWithCategory],
) -> BTreeMap<NaiveDate, Vec<TaskWithCategory>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<TaskWithCategory>> = BTreeMap::new();
    for t in tasks {
        if let Some(due) = t.task.due_date {
            buckets.entry(due.date()).or_default().push(t.clone());
        }
    }
    buckets
}

/// The categories actually referenced by at least one visible task,
/// deduplicated by id and sorted by name. A category with zero referencing
/// tasks does not appear even if it still exists in the store.
pub fn distinct_categories(tasks: &[TaskWithCategory]) -> Vec<Category> {
    let mut seen = HashSet::new();
    let mut categories: Vec<Category> = tasks
        .iter()
        .filter_map(|t| t.category.clone())
        .filter(|c| seen.insert(c.id))
        .collect();
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    categories
}
