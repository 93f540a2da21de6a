//! Typed HTTP client for the gymdesk API.
//!
//! [`ApiClient`] carries an explicit [`AuthSession`] instead of a global
//! token: callers sign in with a session, every request made while signed
//! in sends its bearer token, and signing out drops it.
//!
//! The client also implements [`gymdesk_core::store::ScheduleStore`] and
//! [`gymdesk_core::store::SessionStore`], so a
//! [`gymdesk_core::generation::Generator`] can run on the caller's side
//! against a remote server.

mod client;
mod error;
mod store;

pub use client::{ApiClient, AuthSession, HealthStatus, DEFAULT_API_URL};
pub use error::ClientError;
