pub mod category;
pub mod form;
pub mod task;
pub mod views;

pub use category::{Category, CategoryId, NewCategory};
pub use task::{NewTask, Task, TaskId, TaskWithCategory};
