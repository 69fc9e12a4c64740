//! Domain error types.
//!
//! These errors represent intake validation failures. Store and matching
//! failures have their own types.

use super::geo::Coordinate;

/// A new ride request failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Every request occupies at least one seat
    #[error("seats_required must be at least 1")]
    NoSeats,

    /// Detour budget is negative or not a number
    #[error("detour_tolerance_km must be a finite, non-negative number (got {0})")]
    DetourTolerance(f64),

    /// Latitude or longitude out of range
    #[error("{field} coordinate {value} is out of range")]
    Coordinate {
        field: &'static str,
        value: Coordinate,
    },
}
