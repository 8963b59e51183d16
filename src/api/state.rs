//! Application State
//!
//! Shared state accessible by all API handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::updater::Updater;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Updater owning the dashboard page and charts
    pub updater: Arc<Updater>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(updater: Arc<Updater>) -> Self {
        Self {
            updater,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
