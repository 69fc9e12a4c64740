//! Configuration for matching passes.

use std::time::Duration;

/// Parameters for a matching pass and the operations sharing its lock.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    /// Seat ceiling for every ride built in a pass.
    pub max_seats: u32,

    /// Luggage ceiling for every ride built in a pass.
    pub max_luggage: u32,

    /// How long to wait for the matching lock before giving up.
    /// Applies to matching, cancellation and accept alike.
    pub lock_timeout: Duration,

    /// Surge multiplier applied to every price in the pass.
    pub demand_factor: f64,
}

impl MatchingConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        max_seats: u32,
        max_luggage: u32,
        lock_timeout: Duration,
        demand_factor: f64,
    ) -> Self {
        Self {
            max_seats,
            max_luggage,
            lock_timeout,
            demand_factor,
        }
    }

    pub fn with_capacity(mut self, max_seats: u32, max_luggage: u32) -> Self {
        self.max_seats = max_seats;
        self.max_luggage = max_luggage;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_demand_factor(mut self, demand_factor: f64) -> Self {
        self.demand_factor = demand_factor;
        self
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_seats: 4,
            max_luggage: 4,
            lock_timeout: Duration::from_secs(5),
            demand_factor: 1.0,
        }
    }
}
