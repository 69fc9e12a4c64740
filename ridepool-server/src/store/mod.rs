//! Storage contracts for requests and rides.
//!
//! The matcher only talks to these traits, so it can be tested against
//! [`MemoryStore`] or any other backing store. Every method is a single
//! atomic write or a consistent read; callers that need several writes to
//! appear together hold the matching lock.

mod error;
mod memory;
mod snapshot;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotFile};

use crate::domain::{
    NewRide, NewRideRequest, RequestId, RequestStatus, Ride, RideId, RideRequest, RideStatus,
};

/// Access to ride requests.
pub trait RequestStore {
    /// Validate and store a new pending request.
    fn insert_request(&self, new: NewRideRequest) -> Result<RideRequest, StoreError>;

    /// Look up a request by id.
    fn get_request(&self, id: RequestId) -> Result<RideRequest, StoreError>;

    /// All pending requests, oldest first.
    ///
    /// Ordered by `created_at`, ties broken by id.
    fn list_pending(&self) -> Result<Vec<RideRequest>, StoreError>;

    /// Move a request to a new status.
    ///
    /// Fails with [`StoreError::InvalidRequestTransition`] unless the move is
    /// allowed by [`RequestStatus::can_transition_to`].
    fn set_request_status(&self, id: RequestId, status: RequestStatus)
    -> Result<(), StoreError>;
}

/// Access to rides.
pub trait RideStore {
    /// Store a new proposed ride and return its id.
    ///
    /// Fails with [`StoreError::AlreadyAssigned`] if any member is already
    /// part of another ride.
    fn create_ride(&self, ride: NewRide) -> Result<RideId, StoreError>;

    /// Look up a ride by id.
    fn get_ride(&self, id: RideId) -> Result<Ride, StoreError>;

    /// All rides in creation order.
    fn list_rides(&self) -> Result<Vec<Ride>, StoreError>;

    /// Move a ride to a new status.
    fn set_ride_status(&self, id: RideId, status: RideStatus) -> Result<(), StoreError>;

    /// Attach the per-passenger price.
    fn set_ride_price(&self, id: RideId, price: f64) -> Result<(), StoreError>;

    /// The ride a request belongs to, if any.
    fn ride_for_request(&self, id: RequestId) -> Result<Option<RideId>, StoreError>;
}
