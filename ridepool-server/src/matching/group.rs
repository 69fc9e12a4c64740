//! Greedy grouping of pending requests into rides.
//!
//! A single left-to-right pass: each unassigned request anchors a new group,
//! then every other unassigned request is offered a seat in queue order. A
//! candidate joins if seats and luggage still fit and its detour cost
//! (measured against the anchor) is within its own tolerance. Acceptance is
//! immediate, so the outcome depends entirely on queue order. The pass is
//! quadratic in the number of requests and makes no attempt at a global
//! optimum.

use std::collections::HashSet;

use tracing::{trace, warn};

use crate::domain::{RequestId, RideRequest};

use super::detour::extra_distance_km;

/// Seat and luggage ceilings for every group in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub max_seats: u32,
    pub max_luggage: u32,
}

impl Capacity {
    pub fn new(max_seats: u32, max_luggage: u32) -> Self {
        Self {
            max_seats,
            max_luggage,
        }
    }

    /// Whether a request could ride at all under these ceilings.
    pub fn admits(&self, request: &RideRequest) -> bool {
        request.seats_required <= self.max_seats && request.luggage <= self.max_luggage
    }
}

/// Running totals of the group being built.
struct Load {
    seats: u32,
    luggage: u32,
}

impl Load {
    fn of(request: &RideRequest) -> Self {
        Self {
            seats: request.seats_required,
            luggage: request.luggage,
        }
    }

    fn fits(&self, other: &RideRequest, capacity: Capacity) -> bool {
        let seats = self.seats.checked_add(other.seats_required);
        let luggage = self.luggage.checked_add(other.luggage);
        seats.is_some_and(|s| s <= capacity.max_seats)
            && luggage.is_some_and(|l| l <= capacity.max_luggage)
    }

    fn add(&mut self, other: &RideRequest) {
        self.seats = self.seats.saturating_add(other.seats_required);
        self.luggage = self.luggage.saturating_add(other.luggage);
    }
}

/// Partition `queue` into capacity- and detour-feasible groups.
///
/// `queue` must already be in scan order (oldest first). Every request that
/// fits the ceilings on its own lands in exactly one group; singleton groups
/// are normal. A request too large for the ceilings is left out of every
/// group and stays pending.
pub fn build_groups(queue: &[RideRequest], capacity: Capacity) -> Vec<Vec<RideRequest>> {
    let mut used: HashSet<RequestId> = HashSet::new();
    let mut groups = Vec::new();

    for anchor in queue {
        if used.contains(&anchor.id) {
            continue;
        }
        if !capacity.admits(anchor) {
            warn!(
                request = %anchor.id,
                seats = anchor.seats_required,
                luggage = anchor.luggage,
                "request exceeds ride capacity, leaving pending"
            );
            used.insert(anchor.id);
            continue;
        }

        let mut group = vec![anchor.clone()];
        let mut load = Load::of(anchor);

        for other in queue {
            if other.id == anchor.id || used.contains(&other.id) {
                continue;
            }
            if !load.fits(other, capacity) {
                continue;
            }
            let extra = extra_distance_km(&group, other);
            if extra <= other.detour_tolerance_km {
                trace!(anchor = %anchor.id, candidate = %other.id, extra, "candidate joins group");
                load.add(other);
                group.push(other.clone());
            }
        }

        used.extend(group.iter().map(|r| r.id));
        groups.push(group);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Coordinate, NewRideRequest, RiderId};
    use chrono::{Duration, TimeZone, Utc};

    const ORIGIN: (f64, f64) = (40.72, -73.80);
    const DEST: (f64, f64) = (40.64, -73.78);

    struct Trip {
        origin: (f64, f64),
        dest: (f64, f64),
        seats: u32,
        luggage: u32,
        tolerance: f64,
    }

    impl Default for Trip {
        fn default() -> Self {
            Self {
                origin: ORIGIN,
                dest: DEST,
                seats: 1,
                luggage: 0,
                tolerance: 5.0,
            }
        }
    }

    fn queue(trips: Vec<Trip>) -> Vec<RideRequest> {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap();
        trips
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                NewRideRequest::new(
                    RiderId(i as u64),
                    Coordinate::new(s.origin.0, s.origin.1),
                    Coordinate::new(s.dest.0, s.dest.1),
                )
                .with_seats(s.seats)
                .with_luggage(s.luggage)
                .with_detour_tolerance(s.tolerance)
                .into_request(RequestId(i as u64 + 1), t0 + Duration::seconds(i as i64))
            })
            .collect()
    }

    fn ids(groups: &[Vec<RideRequest>]) -> Vec<Vec<u64>> {
        groups
            .iter()
            .map(|g| g.iter().map(|r| r.id.0).collect())
            .collect()
    }

    fn default_capacity() -> Capacity {
        Capacity::new(4, 4)
    }

    #[test]
    fn empty_queue_has_no_groups() {
        assert!(build_groups(&[], default_capacity()).is_empty());
    }

    #[test]
    fn lone_request_is_a_singleton() {
        let q = queue(vec![Trip::default()]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![1]]);
    }

    #[test]
    fn identical_trips_share() {
        let q = queue(vec![Trip::default(), Trip::default()]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![1, 2]]);
    }

    #[test]
    fn seat_limit_splits_groups() {
        let q = queue(vec![
            Trip {
                seats: 4,
                ..Trip::default()
            },
            Trip {
                seats: 2,
                ..Trip::default()
            },
        ]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![1], vec![2]]);
    }

    #[test]
    fn luggage_limit_splits_groups() {
        let q = queue(vec![
            Trip {
                luggage: 4,
                ..Trip::default()
            },
            Trip {
                luggage: 2,
                ..Trip::default()
            },
        ]);
        let groups = build_groups(&q, default_capacity());
        assert_eq!(ids(&groups), vec![vec![1], vec![2]]);
        for g in &groups {
            assert!(g.iter().map(|r| r.luggage).sum::<u32>() <= 4);
        }
    }

    #[test]
    fn fills_to_exact_capacity_then_overflows() {
        let q = queue((0..6).map(|_| Trip::default()).collect());
        assert_eq!(
            ids(&build_groups(&q, default_capacity())),
            vec![vec![1, 2, 3, 4], vec![5, 6]]
        );
    }

    #[test]
    fn small_request_fills_remaining_seat_later_in_queue() {
        // 3 seats anchor; a 2-seat request can't fit but the 1-seat one after it can.
        let q = queue(vec![
            Trip {
                seats: 3,
                ..Trip::default()
            },
            Trip {
                seats: 2,
                ..Trip::default()
            },
            Trip::default(),
        ]);
        assert_eq!(
            ids(&build_groups(&q, default_capacity())),
            vec![vec![1, 3], vec![2]]
        );
    }

    #[test]
    fn detour_tolerance_is_per_candidate() {
        // Candidate going the opposite way needs a big detour.
        let reverse = Trip {
            origin: DEST,
            dest: ORIGIN,
            ..Trip::default()
        };
        let q = queue(vec![Trip::default(), reverse]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![1], vec![2]]);

        let patient_reverse = Trip {
            origin: DEST,
            dest: ORIGIN,
            tolerance: 1_000.0,
            ..Trip::default()
        };
        let q = queue(vec![Trip::default(), patient_reverse]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![1, 2]]);
    }

    #[test]
    fn zero_tolerance_still_joins_identical_trip() {
        let q = queue(vec![
            Trip::default(),
            Trip {
                tolerance: 0.0,
                ..Trip::default()
            },
        ]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![1, 2]]);
    }

    #[test]
    fn anchor_tolerance_is_not_consulted() {
        // The anchor never pays a detour; only candidates do.
        let q = queue(vec![
            Trip {
                tolerance: 0.0,
                ..Trip::default()
            },
            Trip {
                origin: (40.73, -73.81),
                ..Trip::default()
            },
        ]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![1, 2]]);
    }

    #[test]
    fn oversized_request_is_left_out() {
        let q = queue(vec![
            Trip {
                seats: 5,
                ..Trip::default()
            },
            Trip::default(),
        ]);
        assert_eq!(ids(&build_groups(&q, default_capacity())), vec![vec![2]]);
    }

    #[test]
    fn huge_candidate_does_not_wrap_into_small_group() {
        let q = queue(vec![
            Trip::default(),
            Trip {
                seats: u32::MAX,
                ..Trip::default()
            },
            Trip {
                luggage: u32::MAX,
                ..Trip::default()
            },
            Trip::default(),
        ]);
        let groups = build_groups(&q, default_capacity());
        assert_eq!(ids(&groups), vec![vec![1, 4]]);
    }

    #[test]
    fn order_decides_the_anchor() {
        // Far-away trip first: it anchors alone, the nearby pair groups together.
        let far = Trip {
            origin: (51.5, -0.12),
            dest: (51.47, -0.45),
            ..Trip::default()
        };
        let q = queue(vec![far, Trip::default(), Trip::default()]);
        assert_eq!(
            ids(&build_groups(&q, default_capacity())),
            vec![vec![1], vec![2, 3]]
        );
    }
}
