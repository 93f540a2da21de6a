//! Data access for the `schedules` and `class_sessions` tables.
//!
//! Repositories are zero-sized structs whose methods take a pool (or a
//! connection inside a transaction) and return raw rows with `sqlx::Error`.

pub mod class_session_repo;
pub mod schedule_repo;

pub use class_session_repo::ClassSessionRepo;
pub use schedule_repo::ScheduleRepo;
