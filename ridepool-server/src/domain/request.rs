//! Ride requests: one rider's wish to travel from A to B.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use super::geo::Coordinate;

/// Default detour budget a rider accepts when none is given.
pub const DEFAULT_DETOUR_TOLERANCE_KM: f64 = 5.0;

/// Store-assigned identifier of a ride request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the rider who placed a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiderId(pub u64);

/// Lifecycle of a request.
///
/// `Matched` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Matched,
    Cancelled,
}

impl RequestStatus {
    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Matched)
                | (RequestStatus::Pending, RequestStatus::Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Matched => "matched",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored ride request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RequestId,
    pub rider: RiderId,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub seats_required: u32,
    pub luggage: u32,
    pub detour_tolerance_km: f64,
    pub created_at: DateTime<Utc>,
    pub status: RequestStatus,
}

impl RideRequest {
    /// Length of this rider's own trip, ignoring any sharing.
    pub fn direct_distance_km(&self) -> f64 {
        self.origin.distance_km(&self.destination)
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Intake payload for a new request, before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRideRequest {
    pub rider: RiderId,
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default = "default_seats")]
    pub seats_required: u32,
    #[serde(default)]
    pub luggage: u32,
    #[serde(default = "default_tolerance")]
    pub detour_tolerance_km: f64,
}

fn default_seats() -> u32 {
    1
}

fn default_tolerance() -> f64 {
    DEFAULT_DETOUR_TOLERANCE_KM
}

impl NewRideRequest {
    /// A single-seat request with no luggage and the default detour budget.
    pub fn new(rider: RiderId, origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            rider,
            origin,
            destination,
            seats_required: default_seats(),
            luggage: 0,
            detour_tolerance_km: DEFAULT_DETOUR_TOLERANCE_KM,
        }
    }

    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats_required = seats;
        self
    }

    pub fn with_luggage(mut self, luggage: u32) -> Self {
        self.luggage = luggage;
        self
    }

    pub fn with_detour_tolerance(mut self, km: f64) -> Self {
        self.detour_tolerance_km = km;
        self
    }

    /// Check the fields the matcher relies on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.seats_required == 0 {
            return Err(ValidationError::NoSeats);
        }
        if !self.detour_tolerance_km.is_finite() || self.detour_tolerance_km < 0.0 {
            return Err(ValidationError::DetourTolerance(self.detour_tolerance_km));
        }
        if !self.origin.is_valid() {
            return Err(ValidationError::Coordinate {
                field: "origin",
                value: self.origin,
            });
        }
        if !self.destination.is_valid() {
            return Err(ValidationError::Coordinate {
                field: "destination",
                value: self.destination,
            });
        }
        Ok(())
    }

    /// Attach identity, timestamp and pending status.
    pub fn into_request(self, id: RequestId, created_at: DateTime<Utc>) -> RideRequest {
        RideRequest {
            id,
            rider: self.rider,
            origin: self.origin,
            destination: self.destination,
            seats_required: self.seats_required,
            luggage: self.luggage,
            detour_tolerance_km: self.detour_tolerance_km,
            created_at,
            status: RequestStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewRideRequest {
        NewRideRequest::new(
            RiderId(1),
            Coordinate::new(40.72, -73.80),
            Coordinate::new(40.64, -73.78),
        )
    }

    #[test]
    fn defaults() {
        let req = sample();
        assert_eq!(req.seats_required, 1);
        assert_eq!(req.luggage, 0);
        assert_eq!(req.detour_tolerance_km, 5.0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn serde_fills_defaults() {
        let json = r#"{"rider":7,"origin":{"lat":1.0,"lng":2.0},"destination":{"lat":3.0,"lng":4.0}}"#;
        let req: NewRideRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.rider, RiderId(7));
        assert_eq!(req.seats_required, 1);
        assert_eq!(req.luggage, 0);
        assert_eq!(req.detour_tolerance_km, DEFAULT_DETOUR_TOLERANCE_KM);
    }

    #[test]
    fn rejects_zero_seats() {
        assert_eq!(sample().with_seats(0).validate(), Err(ValidationError::NoSeats));
    }

    #[test]
    fn rejects_negative_or_nan_tolerance() {
        assert!(sample().with_detour_tolerance(-0.1).validate().is_err());
        assert!(sample().with_detour_tolerance(f64::NAN).validate().is_err());
        assert!(sample().with_detour_tolerance(0.0).validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut req = sample();
        req.destination = Coordinate::new(0.0, 200.0);
        assert!(matches!(
            req.validate(),
            Err(ValidationError::Coordinate {
                field: "destination",
                ..
            })
        ));
    }

    #[test]
    fn status_transitions_are_monotonic() {
        use RequestStatus::*;
        assert!(Pending.can_transition_to(Matched));
        assert!(Pending.can_transition_to(Cancelled));
        for terminal in [Matched, Cancelled] {
            for next in [Pending, Matched, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(RequestStatus::Matched.to_string(), "matched");
    }

    #[test]
    fn into_request_is_pending() {
        let now = Utc::now();
        let req = sample().with_luggage(2).into_request(RequestId(3), now);
        assert_eq!(req.id, RequestId(3));
        assert_eq!(req.luggage, 2);
        assert_eq!(req.created_at, now);
        assert!(req.is_pending());
    }
}
