//! Request handlers, one module per resource.

pub mod class_sessions;
pub mod schedules;
