//! The in-memory source of truth for trips and vehicles.
//!
//! All mutations here are synchronous and pure-functional: each operation
//! builds new collections rather than mutating arrays in place, mirroring how
//! the UI consumes the state (a mutation is visible immediately; the durable
//! write happens separately, see [`crate::persist`]).
//!
//! `current_trip` is a cached copy of the selected trip, not separately owned
//! data: [`TripState::update_trip`] keeps it in sync and
//! [`TripState::delete_trip`] clears it when the selected trip goes away.

use crate::model::{DiaryEntry, Trip, Vehicle};
use serde::{Deserialize, Serialize};

/// The persisted subset of [`TripState`]. Doubles as the export/import file
/// shape: `{ "trips": [...], "vehicles": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub trips: Vec<Trip>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

/// Fields [`TripState::update_trip`] may shallow-merge into a trip. `Some`
/// overwrites the field, `None` leaves it alone.
#[derive(Debug, Clone, Default)]
pub struct TripPatch {
    pub name: Option<String>,
    pub province: Option<String>,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub vehicle: Option<Vehicle>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
}

impl TripPatch {
    fn apply(&self, trip: &Trip) -> Trip {
        let mut merged = trip.clone();
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(province) = &self.province {
            merged.province = Some(province.clone());
        }
        if let Some(started_at) = &self.started_at {
            merged.started_at = Some(started_at.clone());
        }
        if let Some(ended_at) = &self.ended_at {
            merged.ended_at = Some(ended_at.clone());
        }
        if let Some(vehicle) = &self.vehicle {
            merged.vehicle = Some(vehicle.clone());
        }
        if let Some(cover_image) = &self.cover_image {
            merged.cover_image = Some(cover_image.clone());
        }
        if let Some(description) = &self.description {
            merged.description = Some(description.clone());
        }
        merged
    }
}

#[derive(Debug, Clone, Default)]
pub struct TripState {
    pub trips: Vec<Trip>,
    pub vehicles: Vec<Vehicle>,
    pub current_trip: Option<Trip>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TripState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a trip. The caller supplies the id; duplicate ids are caller
    /// error and are not deduplicated here.
    pub fn add_trip(&mut self, trip: Trip) {
        let mut trips = self.trips.clone();
        trips.push(trip);
        self.trips = trips;
        self.error = None;
    }

    /// Appends an entry to the named trip. An unmatched trip id leaves the
    /// state unchanged (silent no-op, preserved behavior).
    pub fn add_diary_entry(&mut self, trip_id: &str, entry: DiaryEntry) {
        self.trips = self
            .trips
            .iter()
            .map(|trip| {
                if trip.id == trip_id {
                    let mut updated = trip.clone();
                    updated.entries.push(entry.clone());
                    updated
                } else {
                    trip.clone()
                }
            })
            .collect();
        self.error = None;
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) {
        let mut vehicles = self.vehicles.clone();
        vehicles.push(vehicle);
        self.vehicles = vehicles;
        self.error = None;
    }

    /// Removes the matching vehicle. Trips referencing it keep their copy:
    /// the reference dangles, it does not cascade.
    pub fn delete_vehicle(&mut self, id: &str) {
        self.vehicles = self
            .vehicles
            .iter()
            .filter(|v| v.id != id)
            .cloned()
            .collect();
    }

    /// Sets `current_trip` to the matching trip, or `None` if unmatched.
    pub fn set_current_trip(&mut self, trip_id: &str) {
        self.current_trip = self.trips.iter().find(|t| t.id == trip_id).cloned();
        self.error = None;
    }

    pub fn delete_trip(&mut self, trip_id: &str) {
        self.trips = self
            .trips
            .iter()
            .filter(|t| t.id != trip_id)
            .cloned()
            .collect();
        if self
            .current_trip
            .as_ref()
            .is_some_and(|current| current.id == trip_id)
        {
            self.current_trip = None;
        }
        self.error = None;
    }

    pub fn delete_diary_entry(&mut self, trip_id: &str, entry_id: &str) {
        self.trips = self
            .trips
            .iter()
            .map(|trip| {
                if trip.id == trip_id {
                    let mut updated = trip.clone();
                    updated.entries = trip
                        .entries
                        .iter()
                        .filter(|e| e.id != entry_id)
                        .cloned()
                        .collect();
                    updated
                } else {
                    trip.clone()
                }
            })
            .collect();
        self.error = None;
    }

    /// Shallow-merges `patch` into the matching trip, and into
    /// `current_trip` when it is the same trip.
    pub fn update_trip(&mut self, trip_id: &str, patch: &TripPatch) {
        self.trips = self
            .trips
            .iter()
            .map(|trip| {
                if trip.id == trip_id {
                    patch.apply(trip)
                } else {
                    trip.clone()
                }
            })
            .collect();
        if let Some(current) = &self.current_trip {
            if current.id == trip_id {
                self.current_trip = Some(patch.apply(current));
            }
        }
    }

    /// Resets every collection to empty. Evicting the persisted record is the
    /// caller's concern (see [`crate::persist::Persister::clear`]).
    pub fn clear_all(&mut self) {
        self.trips = Vec::new();
        self.vehicles = Vec::new();
        self.current_trip = None;
        self.loading = false;
        self.error = None;
    }

    /// Replaces both collections wholesale (successful import).
    /// `current_trip` is intentionally left untouched.
    pub fn replace_collections(&mut self, snapshot: StateSnapshot) {
        self.trips = snapshot.trips;
        self.vehicles = snapshot.vehicles;
    }

    pub fn find_trip(&self, trip_id: &str) -> Option<&Trip> {
        self.trips.iter().find(|t| t.id == trip_id)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            trips: self.trips.clone(),
            vehicles: self.vehicles.clone(),
        }
    }

    pub fn hydrate(&mut self, snapshot: StateSnapshot) {
        self.trips = snapshot.trips;
        self.vehicles = snapshot.vehicles;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}
