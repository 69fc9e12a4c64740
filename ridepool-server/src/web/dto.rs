//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Coordinate, DEFAULT_DETOUR_TOLERANCE_KM, NewRideRequest, RequestStatus, Ride, RideId,
    RideRequest, RideStatus, RiderId,
};
use crate::matching::MatchOutcome;

/// Request to create a ride request.
#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// Rider placing the request
    pub user_id: u64,

    pub origin_lat: f64,
    pub origin_lng: f64,
    pub dest_lat: f64,
    pub dest_lng: f64,

    /// Seats needed (defaults to 1)
    pub seats_required: Option<u32>,

    /// Pieces of luggage (defaults to 0)
    pub luggage: Option<u32>,

    /// Extra kilometres the rider accepts (defaults to 5.0)
    pub detour_tolerance_km: Option<f64>,
}

impl CreateRequestBody {
    pub fn into_new_request(self) -> NewRideRequest {
        NewRideRequest::new(
            RiderId(self.user_id),
            Coordinate::new(self.origin_lat, self.origin_lng),
            Coordinate::new(self.dest_lat, self.dest_lng),
        )
        .with_seats(self.seats_required.unwrap_or(1))
        .with_luggage(self.luggage.unwrap_or(0))
        .with_detour_tolerance(
            self.detour_tolerance_km
                .unwrap_or(DEFAULT_DETOUR_TOLERANCE_KM),
        )
    }
}

/// Response to a created request.
#[derive(Debug, Serialize)]
pub struct CreateRequestResponse {
    pub request_id: u64,
}

/// A request in the pending list.
#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: u64,
    pub user_id: u64,

    /// `[lat, lng]`
    pub origin: [f64; 2],

    /// `[lat, lng]`
    pub dest: [f64; 2],

    pub seats_required: u32,
    pub luggage: u32,
    pub detour_tolerance_km: f64,

    /// RFC 3339 creation time
    pub created_at: String,

    pub status: RequestStatus,
}

impl RequestView {
    pub fn from_request(request: &RideRequest) -> Self {
        Self {
            id: request.id.0,
            user_id: request.rider.0,
            origin: lat_lng(request.origin),
            dest: lat_lng(request.destination),
            seats_required: request.seats_required,
            luggage: request.luggage,
            detour_tolerance_km: request.detour_tolerance_km,
            created_at: request.created_at.to_rfc3339(),
            status: request.status,
        }
    }
}

/// Response to a cancellation.
#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub status: RequestStatus,
    pub request_id: u64,
}

/// Optional overrides for a triggered matching pass.
#[derive(Debug, Default, Deserialize)]
pub struct TriggerMatchQuery {
    pub max_seats: Option<u32>,
    pub max_luggage: Option<u32>,
}

/// Result of a triggered matching pass.
///
/// Either `{"created_rides": n, "ride_ids": [...]}` or `{"status": "locked"}`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MatchResponse {
    Completed {
        created_rides: usize,
        ride_ids: Vec<u64>,
    },
    Locked {
        status: &'static str,
    },
}

impl MatchResponse {
    pub fn from_outcome(outcome: &MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::Completed { rides } => MatchResponse::Completed {
                created_rides: rides.len(),
                ride_ids: rides.iter().map(|id| id.0).collect(),
            },
            MatchOutcome::Locked => MatchResponse::Locked { status: "locked" },
        }
    }
}

/// A ride's details.
#[derive(Debug, Serialize)]
pub struct RideView {
    pub id: u64,

    /// Member request ids, anchor first
    pub requests: Vec<u64>,

    pub seats_total: u32,
    pub luggage_capacity: u32,
    pub occupancy: u32,
    pub luggage_used: u32,

    /// Anchor pickup `[lat, lng]`
    pub origin: [f64; 2],

    /// Anchor drop-off `[lat, lng]`
    pub dest: [f64; 2],

    pub total_distance_km: f64,
    pub price_per_passenger: Option<f64>,

    /// RFC 3339 creation time
    pub created_at: String,

    pub status: RideStatus,
}

impl RideView {
    pub fn from_ride(ride: &Ride) -> Self {
        Self {
            id: ride.id.0,
            requests: ride.members.iter().map(|id| id.0).collect(),
            seats_total: ride.seats_total,
            luggage_capacity: ride.luggage_capacity,
            occupancy: ride.occupancy,
            luggage_used: ride.luggage_used,
            origin: lat_lng(ride.origin),
            dest: lat_lng(ride.destination),
            total_distance_km: ride.total_distance_km,
            price_per_passenger: ride.price_per_passenger,
            created_at: ride.created_at.to_rfc3339(),
            status: ride.status,
        }
    }
}

/// Response to an accepted ride.
#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    pub ride_id: u64,
    pub status: RideStatus,
}

impl AcceptResponse {
    pub fn new(ride_id: RideId, status: RideStatus) -> Self {
        Self {
            ride_id: ride_id.0,
            status,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn lat_lng(c: Coordinate) -> [f64; 2] {
    [c.lat, c.lng]
}
