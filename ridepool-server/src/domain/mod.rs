//! Domain types for the ride pooling service.
//!
//! Requests and rides carry typed identifiers and explicit status
//! enums whose transition rules are checked by the store.

mod error;
mod geo;
mod request;
mod ride;

pub use error::ValidationError;
pub use geo::{Coordinate, EARTH_RADIUS_KM, haversine_km};
pub use request::{
    DEFAULT_DETOUR_TOLERANCE_KM, NewRideRequest, RequestId, RequestStatus, RideRequest, RiderId,
};
pub use ride::{NewRide, Ride, RideId, RideStatus};
