//! In-process store backed by ordered maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::domain::{
    NewRide, NewRideRequest, RequestId, RequestStatus, Ride, RideId, RideRequest, RideStatus,
};

use super::error::StoreError;
use super::snapshot::Snapshot;
use super::{RequestStore, RideStore};

#[derive(Debug, Default)]
struct Tables {
    requests: BTreeMap<RequestId, RideRequest>,
    rides: BTreeMap<RideId, Ride>,
    /// Back-reference from a request to the ride that owns it.
    membership: HashMap<RequestId, RideId>,
    next_request_id: u64,
    next_ride_id: u64,
}

/// Thread-safe in-memory store.
///
/// Each trait method takes the table lock once, so every write is atomic on
/// its own. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a saved snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let membership = snapshot
            .rides
            .iter()
            .flat_map(|ride| ride.members.iter().map(move |m| (*m, ride.id)))
            .collect();

        let next_request_id = snapshot
            .requests
            .iter()
            .map(|r| r.id.0)
            .max()
            .unwrap_or(0)
            .max(snapshot.next_request_id);
        let next_ride_id = snapshot
            .rides
            .iter()
            .map(|r| r.id.0)
            .max()
            .unwrap_or(0)
            .max(snapshot.next_ride_id);

        let tables = Tables {
            requests: snapshot.requests.into_iter().map(|r| (r.id, r)).collect(),
            rides: snapshot.rides.into_iter().map(|r| (r.id, r)).collect(),
            membership,
            next_request_id,
            next_ride_id,
        };

        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Copy the current contents into a snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let tables = self.read()?;
        Ok(Snapshot {
            saved_at: Utc::now(),
            requests: tables.requests.values().cloned().collect(),
            rides: tables.rides.values().cloned().collect(),
            next_request_id: tables.next_request_id,
            next_ride_id: tables.next_ride_id,
        })
    }

    /// Store a new request with an explicit creation time.
    ///
    /// Intake normally stamps the current time; this exists so callers
    /// replaying or seeding data can control the queue order.
    pub fn insert_request_at(
        &self,
        new: NewRideRequest,
        created_at: DateTime<Utc>,
    ) -> Result<RideRequest, StoreError> {
        new.validate()?;
        let mut tables = self.write()?;
        tables.next_request_id += 1;
        let id = RequestId(tables.next_request_id);
        let request = new.into_request(id, created_at);
        tables.requests.insert(id, request.clone());
        Ok(request)
    }

    /// Number of stored requests, in any status.
    pub fn request_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.requests.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

impl RequestStore for MemoryStore {
    fn insert_request(&self, new: NewRideRequest) -> Result<RideRequest, StoreError> {
        self.insert_request_at(new, Utc::now())
    }

    fn get_request(&self, id: RequestId) -> Result<RideRequest, StoreError> {
        self.read()?
            .requests
            .get(&id)
            .cloned()
            .ok_or(StoreError::RequestNotFound(id))
    }

    fn list_pending(&self) -> Result<Vec<RideRequest>, StoreError> {
        let tables = self.read()?;
        // BTreeMap iteration is by id, so a stable sort on created_at keeps
        // id order among equal timestamps.
        let mut pending: Vec<RideRequest> = tables
            .requests
            .values()
            .filter(|r| r.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        Ok(pending)
    }

    fn set_request_status(
        &self,
        id: RequestId,
        status: RequestStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let request = tables
            .requests
            .get_mut(&id)
            .ok_or(StoreError::RequestNotFound(id))?;
        if !request.status.can_transition_to(status) {
            return Err(StoreError::InvalidRequestTransition {
                id,
                from: request.status,
                to: status,
            });
        }
        request.status = status;
        Ok(())
    }
}

impl RideStore for MemoryStore {
    fn create_ride(&self, ride: NewRide) -> Result<RideId, StoreError> {
        let mut tables = self.write()?;

        for member in &ride.members {
            if !tables.requests.contains_key(member) {
                return Err(StoreError::RequestNotFound(*member));
            }
            if let Some(existing) = tables.membership.get(member) {
                return Err(StoreError::AlreadyAssigned {
                    request: *member,
                    ride: *existing,
                });
            }
        }

        tables.next_ride_id += 1;
        let id = RideId(tables.next_ride_id);
        for member in &ride.members {
            tables.membership.insert(*member, id);
        }
        tables.rides.insert(id, ride.into_ride(id, Utc::now()));
        Ok(id)
    }

    fn get_ride(&self, id: RideId) -> Result<Ride, StoreError> {
        self.read()?
            .rides
            .get(&id)
            .cloned()
            .ok_or(StoreError::RideNotFound(id))
    }

    fn list_rides(&self) -> Result<Vec<Ride>, StoreError> {
        Ok(self.read()?.rides.values().cloned().collect())
    }

    fn set_ride_status(&self, id: RideId, status: RideStatus) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let ride = tables
            .rides
            .get_mut(&id)
            .ok_or(StoreError::RideNotFound(id))?;
        if !ride.status.can_transition_to(status) {
            return Err(StoreError::InvalidRideTransition {
                id,
                from: ride.status,
                to: status,
            });
        }
        ride.status = status;
        Ok(())
    }

    fn set_ride_price(&self, id: RideId, price: f64) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let ride = tables
            .rides
            .get_mut(&id)
            .ok_or(StoreError::RideNotFound(id))?;
        ride.price_per_passenger = Some(price);
        Ok(())
    }

    fn ride_for_request(&self, id: RequestId) -> Result<Option<RideId>, StoreError> {
        let tables = self.read()?;
        if !tables.requests.contains_key(&id) {
            return Err(StoreError::RequestNotFound(id));
        }
        Ok(tables.membership.get(&id).copied())
    }
}
