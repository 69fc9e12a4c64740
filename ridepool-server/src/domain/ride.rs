//! Rides: a group of requests travelling together.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::Coordinate;
use super::request::{RequestId, RideRequest};

/// Store-assigned identifier of a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RideId(pub u64);

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a ride.
///
/// Only `Proposed -> Active`, `Proposed -> Cancelled`, `Active -> Completed`
/// and `Active -> Cancelled` are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Proposed,
    Active,
    Completed,
    Cancelled,
}

impl RideStatus {
    pub fn can_transition_to(self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (RideStatus::Proposed, RideStatus::Active)
                | (RideStatus::Proposed, RideStatus::Cancelled)
                | (RideStatus::Active, RideStatus::Completed)
                | (RideStatus::Active, RideStatus::Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Proposed => "proposed",
            RideStatus::Active => "active",
            RideStatus::Completed => "completed",
            RideStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ride proposal ready to be stored.
///
/// Built from a finalized group; the store assigns the id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRide {
    pub members: Vec<RequestId>,
    pub seats_total: u32,
    pub luggage_capacity: u32,
    pub seats_used: u32,
    pub luggage_used: u32,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub total_distance_km: f64,
}

impl NewRide {
    /// Summarise a non-empty group under the given capacity ceilings.
    ///
    /// The first member supplies the display endpoints. Returns `None` for
    /// an empty group.
    pub fn from_group(
        group: &[RideRequest],
        seats_total: u32,
        luggage_capacity: u32,
    ) -> Option<Self> {
        let first = group.first()?;
        Some(Self {
            members: group.iter().map(|r| r.id).collect(),
            seats_total,
            luggage_capacity,
            seats_used: group
                .iter()
                .fold(0u32, |acc, r| acc.saturating_add(r.seats_required)),
            luggage_used: group
                .iter()
                .fold(0u32, |acc, r| acc.saturating_add(r.luggage)),
            origin: first.origin,
            destination: first.destination,
            total_distance_km: group.iter().map(RideRequest::direct_distance_km).sum(),
        })
    }

    pub fn occupancy(&self) -> u32 {
        self.members.len() as u32
    }

    pub fn into_ride(self, id: RideId, created_at: DateTime<Utc>) -> Ride {
        Ride {
            id,
            occupancy: self.occupancy(),
            members: self.members,
            seats_total: self.seats_total,
            luggage_capacity: self.luggage_capacity,
            seats_used: self.seats_used,
            luggage_used: self.luggage_used,
            origin: self.origin,
            destination: self.destination,
            total_distance_km: self.total_distance_km,
            price_per_passenger: None,
            created_at,
            status: RideStatus::Proposed,
        }
    }
}

/// A stored ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: RideId,
    /// Member requests in the order they joined; the first is the anchor.
    pub members: Vec<RequestId>,
    pub seats_total: u32,
    pub luggage_capacity: u32,
    pub occupancy: u32,
    pub seats_used: u32,
    pub luggage_used: u32,
    /// Anchor's pickup point, for display only.
    pub origin: Coordinate,
    /// Anchor's drop-off point, for display only.
    pub destination: Coordinate,
    /// Sum of each member's direct trip length.
    pub total_distance_km: f64,
    pub price_per_passenger: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub status: RideStatus,
}

impl Ride {
    pub fn contains(&self, request: RequestId) -> bool {
        self.members.contains(&request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewRideRequest, RiderId};

    fn request(id: u64, seats: u32, luggage: u32) -> RideRequest {
        NewRideRequest::new(
            RiderId(id),
            Coordinate::new(40.72, -73.80),
            Coordinate::new(40.64, -73.78),
        )
        .with_seats(seats)
        .with_luggage(luggage)
        .into_request(RequestId(id), Utc::now())
    }

    #[test]
    fn from_group_sums_members() {
        let group = vec![request(1, 1, 2), request(2, 2, 1)];
        let ride = NewRide::from_group(&group, 4, 4).unwrap();

        assert_eq!(ride.members, vec![RequestId(1), RequestId(2)]);
        assert_eq!(ride.occupancy(), 2);
        assert_eq!(ride.seats_used, 3);
        assert_eq!(ride.luggage_used, 3);
        assert_eq!(ride.origin, group[0].origin);
        let expected = group[0].direct_distance_km() * 2.0;
        assert!((ride.total_distance_km - expected).abs() < 1e-9);
    }

    #[test]
    fn from_group_totals_saturate() {
        let group = vec![request(1, u32::MAX, u32::MAX), request(2, 1, 1)];
        let ride = NewRide::from_group(&group, 4, 4).unwrap();
        assert_eq!(ride.seats_used, u32::MAX);
        assert_eq!(ride.luggage_used, u32::MAX);
    }

    #[test]
    fn from_empty_group_is_none() {
        assert!(NewRide::from_group(&[], 4, 4).is_none());
    }

    #[test]
    fn into_ride_starts_proposed_without_price() {
        let ride = NewRide::from_group(&[request(1, 1, 0)], 4, 4)
            .unwrap()
            .into_ride(RideId(9), Utc::now());
        assert_eq!(ride.id, RideId(9));
        assert_eq!(ride.status, RideStatus::Proposed);
        assert_eq!(ride.occupancy, 1);
        assert!(ride.price_per_passenger.is_none());
        assert!(ride.contains(RequestId(1)));
        assert!(!ride.contains(RequestId(2)));
    }

    #[test]
    fn ride_transitions() {
        use RideStatus::*;
        assert!(Proposed.can_transition_to(Active));
        assert!(Active.can_transition_to(Completed));
        assert!(!Active.can_transition_to(Proposed));
        assert!(!Proposed.can_transition_to(Completed));
        for next in [Proposed, Active, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }
}
