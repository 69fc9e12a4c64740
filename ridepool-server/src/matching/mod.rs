//! Greedy ride matching.
//!
//! This module turns the queue of pending requests into proposed rides.
//! A pass groups requests greedily in creation order under seat, luggage
//! and per-rider detour limits, prices each group, and stores the result,
//! all while holding one process-wide named lock that cancellations also
//! take.

mod config;
mod detour;
mod group;
mod lock;
mod matcher;


pub use config::MatchingConfig;
pub use detour::extra_distance_km;
pub use group::{Capacity, build_groups};
pub use lock::{LockRegistry, MATCHING_LOCK, NamedLockGuard};
pub use matcher::{MatchError, MatchOutcome, Matcher};
