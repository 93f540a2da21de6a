use std::sync::Arc;

use gymdesk_core::generation::Generator;
use gymdesk_core::store::{ScheduleStore, SessionStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub schedules: Arc<dyn ScheduleStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// A generator over this state's stores with the configured defaults.
    pub fn generator(&self) -> Generator {
        Generator::new(
            Arc::clone(&self.schedules),
            Arc::clone(&self.sessions),
            self.config.generation,
        )
    }
}
