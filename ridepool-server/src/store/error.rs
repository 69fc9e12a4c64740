//! Store error types.

use crate::domain::{RequestId, RequestStatus, RideId, RideStatus, ValidationError};

/// Errors that can occur when reading or writing requests and rides.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// No request with this id
    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    /// No ride with this id
    #[error("ride {0} not found")]
    RideNotFound(RideId),

    /// Request status change would leave a terminal state
    #[error("request {id} cannot move from {from} to {to}")]
    InvalidRequestTransition {
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    },

    /// Ride status change is not a legal lifecycle step
    #[error("ride {id} cannot move from {from} to {to}")]
    InvalidRideTransition {
        id: RideId,
        from: RideStatus,
        to: RideStatus,
    },

    /// Request already belongs to a ride
    #[error("request {request} already belongs to ride {ride}")]
    AlreadyAssigned { request: RequestId, ride: RideId },

    /// Intake payload rejected
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// A writer panicked while holding the store lock
    #[error("store lock poisoned")]
    Poisoned,

    /// Snapshot file could not be read or written
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            StoreError::RequestNotFound(RequestId(4)).to_string(),
            "request 4 not found"
        );
        assert_eq!(
            StoreError::InvalidRequestTransition {
                id: RequestId(1),
                from: RequestStatus::Matched,
                to: RequestStatus::Cancelled,
            }
            .to_string(),
            "request 1 cannot move from matched to cancelled"
        );
        assert_eq!(
            StoreError::InvalidRideTransition {
                id: RideId(2),
                from: RideStatus::Active,
                to: RideStatus::Active,
            }
            .to_string(),
            "ride 2 cannot move from active to active"
        );
        assert_eq!(
            StoreError::AlreadyAssigned {
                request: RequestId(3),
                ride: RideId(1),
            }
            .to_string(),
            "request 3 already belongs to ride 1"
        );
        assert_eq!(
            StoreError::from(ValidationError::NoSeats).to_string(),
            "invalid request: seats_required must be at least 1"
        );
    }
}
