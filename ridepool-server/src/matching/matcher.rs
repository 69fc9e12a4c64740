//! Lock-protected matching passes and the operations that share their lock.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::{NewRide, RequestId, RequestStatus, RideId, RideRequest, RideStatus};
use crate::pricing::PricingConfig;
use crate::store::{RequestStore, RideStore, StoreError};

use super::config::MatchingConfig;
use super::group::{Capacity, build_groups};
use super::lock::{LockRegistry, MATCHING_LOCK, NamedLockGuard};

/// Error from a lock-protected operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// The store rejected a read or write
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Cancellation or accept could not get the lock in time
    #[error("lock '{lock}' busy after {timeout:?}")]
    LockTimeout {
        lock: &'static str,
        timeout: Duration,
    },
}

/// Result of one matching pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The pass ran; these rides were created, in creation order.
    Completed { rides: Vec<RideId> },

    /// Another pass or cancellation held the lock for the whole timeout.
    /// Nothing was read or written; try again later.
    Locked,
}

impl MatchOutcome {
    /// Rides created by the pass, or `None` if it never ran.
    pub fn created_rides(&self) -> Option<usize> {
        match self {
            MatchOutcome::Completed { rides } => Some(rides.len()),
            MatchOutcome::Locked => None,
        }
    }
}

/// Runs matching passes against a store.
///
/// Every mutation of request status and every ride creation happens while
/// holding the registry's [`MATCHING_LOCK`]. Clones share the store and the
/// registry.
pub struct Matcher<S> {
    store: Arc<S>,
    locks: Arc<LockRegistry>,
    config: MatchingConfig,
    pricing: PricingConfig,
}

impl<S> Clone for Matcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            locks: self.locks.clone(),
            config: self.config.clone(),
            pricing: self.pricing.clone(),
        }
    }
}

impl<S> Matcher<S>
where
    S: RequestStore + RideStore,
{
    pub fn new(store: Arc<S>, locks: Arc<LockRegistry>, config: MatchingConfig) -> Self {
        Self {
            store,
            locks,
            config,
            pricing: PricingConfig::default(),
        }
    }

    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Run a pass with the configured seat and luggage ceilings.
    pub async fn run(&self) -> Result<MatchOutcome, MatchError> {
        self.run_matching_pass(self.config.max_seats, self.config.max_luggage)
            .await
    }

    /// Group every pending request into proposed rides.
    ///
    /// Waits up to the configured timeout for the matching lock and returns
    /// [`MatchOutcome::Locked`] without touching the store if it stays busy.
    /// Each ride is stored, then its members are marked matched, then its
    /// price is attached. The lock is released on every exit path.
    pub async fn run_matching_pass(
        &self,
        max_seats: u32,
        max_luggage: u32,
    ) -> Result<MatchOutcome, MatchError> {
        let Some(_guard) = self
            .locks
            .acquire(MATCHING_LOCK, self.config.lock_timeout)
            .await
        else {
            warn!(timeout = ?self.config.lock_timeout, "matching pass skipped, lock busy");
            return Ok(MatchOutcome::Locked);
        };

        let pending = self.store.list_pending()?;
        if pending.is_empty() {
            debug!("no pending requests");
            return Ok(MatchOutcome::Completed { rides: Vec::new() });
        }

        let capacity = Capacity::new(max_seats, max_luggage);
        let groups = build_groups(&pending, capacity);
        debug!(
            pending = pending.len(),
            groups = groups.len(),
            "grouped pending requests"
        );

        let mut rides = Vec::with_capacity(groups.len());
        for group in &groups {
            let Some(ride) = NewRide::from_group(group, max_seats, max_luggage) else {
                continue;
            };
            rides.push(self.persist_ride(ride, group)?);
        }

        info!(
            pending = pending.len(),
            created_rides = rides.len(),
            "matching pass complete"
        );
        Ok(MatchOutcome::Completed { rides })
    }

    /// Cancel a pending request.
    ///
    /// Takes the matching lock so a running pass cannot group a request that
    /// is being cancelled. Fails if the request is already matched or
    /// cancelled.
    pub async fn cancel_request(&self, id: RequestId) -> Result<RideRequest, MatchError> {
        let _guard = self.lock().await?;
        self.store
            .set_request_status(id, RequestStatus::Cancelled)?;
        info!(request = %id, "request cancelled");
        Ok(self.store.get_request(id)?)
    }

    /// Move a proposed ride to active.
    pub async fn accept_ride(&self, id: RideId) -> Result<RideStatus, MatchError> {
        let _guard = self.lock().await?;
        self.store.set_ride_status(id, RideStatus::Active)?;
        info!(ride = %id, "ride accepted");
        Ok(RideStatus::Active)
    }

    async fn lock(&self) -> Result<NamedLockGuard, MatchError> {
        let timeout = self.config.lock_timeout;
        self.locks
            .acquire(MATCHING_LOCK, timeout)
            .await
            .ok_or(MatchError::LockTimeout {
                lock: MATCHING_LOCK,
                timeout,
            })
    }

    fn persist_ride(&self, ride: NewRide, group: &[RideRequest]) -> Result<RideId, MatchError> {
        debug_assert!(ride.seats_used <= ride.seats_total, "seat ceiling exceeded");
        debug_assert!(ride.luggage_used <= ride.luggage_capacity, "luggage ceiling exceeded");

        let occupancy = ride.occupancy();
        let seats_total = ride.seats_total;
        let total_distance_km = ride.total_distance_km;
        let id = self.store.create_ride(ride)?;

        for member in group {
            self.store
                .set_request_status(member.id, RequestStatus::Matched)?;
        }

        let price = self.pricing.price(
            total_distance_km,
            occupancy,
            seats_total,
            self.config.demand_factor,
        );
        self.store.set_ride_price(id, price)?;

        debug!(ride = %id, occupancy, price, "ride proposed");
        Ok(id)
    }
}
