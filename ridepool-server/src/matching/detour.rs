//! Detour cost of adding a rider to a forming group.

use crate::domain::{RideRequest, haversine_km};

/// Approximate extra kilometres `candidate` travels by joining `group`.
///
/// Only the group's first member (its anchor) is considered. The shared path
/// is taken to be candidate origin → anchor origin → anchor destination →
/// candidate destination, and the result is that path's length minus the
/// candidate's direct trip, floored at zero. This is a deliberate
/// approximation, not an insertion-cost routing solver; grouping and pricing
/// depend on its exact arithmetic.
pub fn extra_distance_km(group: &[RideRequest], candidate: &RideRequest) -> f64 {
    let Some(anchor) = group.first() else {
        return 0.0;
    };

    let direct = haversine_km(candidate.origin, candidate.destination);
    let via = haversine_km(candidate.origin, anchor.origin)
        + haversine_km(anchor.origin, anchor.destination)
        + haversine_km(anchor.destination, candidate.destination);

    (via - direct).max(0.0)
}
