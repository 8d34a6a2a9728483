//! Configuration for sync scheduling and dispatch.

use std::time::Duration;

/// Configuration for the sync orchestrator and scheduler.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How long a burst of local edits must settle before a sync pass
    /// is triggered. Reset on every qualifying edit.
    pub debounce_window: Duration,
    /// Timeout applied to every individual remote request.
    pub request_timeout: Duration,
}

impl SyncConfig {
    /// Creates a configuration with the default windows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            debounce_window: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the debounce window.
    #[must_use]
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}
