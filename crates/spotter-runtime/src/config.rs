//! Session configuration.
//!
//! Plain constructor parameters; nothing here is parsed from files or
//! flags. The embedding service decides the values.

use std::time::Duration;

/// Tunables for one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Capacity of the persistence queue. Sized to absorb one workout
    /// session's worth of sets without back-pressure.
    pub queue_capacity: usize,
    /// How long teardown waits for the background worker to stop before
    /// proceeding anyway.
    pub shutdown_grace: Duration,
    /// End-to-end budget for one delegated reasoning call.
    pub delegate_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            shutdown_grace: Duration::from_secs(5),
            delegate_timeout: Duration::from_secs(2),
        }
    }
}
