//! Database row structs.
//!
//! Each submodule holds a `FromRow` struct matching its table and the
//! conversion into the corresponding `gymdesk_core` type.

pub mod class_session;
pub mod schedule;
