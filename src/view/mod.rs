//! Screen view-states. Each screen owns a struct with a `Message` enum and
//! an `update` method; derived fields are recomputed wholly from the latest
//! inputs on every change. Store subscriptions are explicit
//! `watch::Receiver` handles, dropped when the view is dropped.

pub mod auth;
pub mod calendar;
pub mod chat;
pub mod task_form;
pub mod task_list;
