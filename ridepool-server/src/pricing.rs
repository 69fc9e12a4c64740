//! Per-passenger pricing for shared rides.
//!
//! Formula: `round((base + per_km * distance) * occupancy_discount * demand, 2)`
//! where the occupancy discount drops by a fixed step per extra rider and
//! saturates at a floor.

/// Base fare in currency units.
pub const BASE_FARE: f64 = 5.0;

/// Per-kilometre rate in currency units.
pub const PER_KM_RATE: f64 = 1.2;

/// Discount step for each passenger beyond the first.
pub const DISCOUNT_PER_EXTRA_RIDER: f64 = 0.05;

/// Lowest occupancy multiplier; reached at ten passengers.
pub const DISCOUNT_FLOOR: f64 = 0.7;

/// Pricing constants.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub base_fare: f64,
    pub per_km: f64,
    pub discount_per_extra_rider: f64,
    pub discount_floor: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_fare: BASE_FARE,
            per_km: PER_KM_RATE,
            discount_per_extra_rider: DISCOUNT_PER_EXTRA_RIDER,
            discount_floor: DISCOUNT_FLOOR,
        }
    }
}

impl PricingConfig {
    /// Multiplier applied for `occupancy` riders sharing.
    pub fn occupancy_discount(&self, occupancy: u32) -> f64 {
        let extra = occupancy.saturating_sub(1) as f64;
        (1.0 - self.discount_per_extra_rider * extra).max(self.discount_floor)
    }

    /// Price per passenger, rounded to cents.
    ///
    /// `total_distance_km` is the sum of every member's direct trip, not a
    /// shared route length. `seats_total` does not affect the result.
    pub fn price(
        &self,
        total_distance_km: f64,
        occupancy: u32,
        _seats_total: u32,
        demand_factor: f64,
    ) -> f64 {
        let raw = (self.base_fare + self.per_km * total_distance_km)
            * self.occupancy_discount(occupancy)
            * demand_factor;
        round_cents(raw)
    }
}

/// Price per passenger with the default constants.
///
/// # Examples
///
/// ```
/// use ridepool_server::pricing::price_per_passenger;
///
/// assert_eq!(price_per_passenger(10.0, 1, 4, 1.0), 17.0);
/// assert!(price_per_passenger(10.0, 3, 4, 1.0) < 17.0);
/// ```
pub fn price_per_passenger(
    total_distance_km: f64,
    occupancy: u32,
    seats_total: u32,
    demand_factor: f64,
) -> f64 {
    PricingConfig::default().price(total_distance_km, occupancy, seats_total, demand_factor)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
