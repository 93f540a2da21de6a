//! Domain core for the gymdesk class-scheduling backend.
//!
//! Holds the domain types, validation rules, calendar math, the schedule
//! expansion engine and batch orchestrator, and the store traits that the
//! persistence (`gymdesk-db`) and transport (`gymdesk-client`) crates
//! implement. This crate has zero internal deps so every other crate can use
//! it.

pub mod calendar;
pub mod error;
pub mod expansion;
pub mod generation;
pub mod memory;
pub mod roles;
pub mod schedule;
pub mod session;
pub mod store;
pub mod types;
