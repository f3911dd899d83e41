//! # API Facade
//!
//! The single entry point for all trip-diary operations, regardless of the
//! UI driving it. The facade owns the in-memory [`TripState`] and the
//! background [`Persister`]; every mutating operation updates memory
//! synchronously, enqueues a durable write-through, and returns a structured
//! [`CmdResult`] for the caller to render.
//!
//! ## What the API Does NOT Do
//!
//! - **I/O to the terminal**: no stdout, stderr, or exit codes
//! - **Presentation concerns**: returns data structures, not strings
//! - **Blocking on storage**: durable writes happen on the persister thread;
//!   a caller never waits for them
//!
//! Construct with any [`DualStore`] wiring: file-backed for production,
//! memory-backed for tests. This keeps the whole core testable without a UI
//! harness.

use crate::commands::{self, CmdMessage, CmdResult};
use crate::error::{Result, TripDiaryError};
use crate::model::{valid_coords, DiaryEntry, Trip, Vehicle};
use crate::persist::{self, Persister};
use crate::state::{TripPatch, TripState};
use crate::store::adapter::DualStore;
use crate::store::memory::MemoryBackend;
use std::path::Path;

pub struct TripDiaryApi {
    state: TripState,
    persister: Persister,
}

impl TripDiaryApi {
    /// Hydrate from the store (running any pending migration), then hand the
    /// store over to the background persister.
    pub fn new(store: DualStore) -> Self {
        let mut state = TripState::new();
        state.hydrate(persist::load(&store));
        Self {
            state,
            persister: Persister::spawn(store),
        }
    }

    /// An API over throwaway in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(DualStore::new(Box::new(MemoryBackend::new())))
    }

    fn write_through(&self) {
        self.persister.save(self.state.snapshot());
    }

    // --- Reads ---

    pub fn trips(&self) -> &[Trip] {
        &self.state.trips
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.state.vehicles
    }

    pub fn current_trip(&self) -> Option<&Trip> {
        self.state.current_trip.as_ref()
    }

    pub fn find_trip(&self, trip_id: &str) -> Option<&Trip> {
        self.state.find_trip(trip_id)
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    // --- Mutations ---

    pub fn add_trip(&mut self, trip: Trip) -> Result<CmdResult> {
        if trip.name.trim().is_empty() {
            return Err(TripDiaryError::Validation(
                "Trip name cannot be empty".to_string(),
            ));
        }

        let mut result = CmdResult::default().with_trips(vec![trip.clone()]);
        result.add_message(CmdMessage::success(format!("Added trip: {}", trip.name)));
        self.state.add_trip(trip);
        self.write_through();
        Ok(result)
    }

    pub fn add_diary_entry(&mut self, trip_id: &str, entry: DiaryEntry) -> Result<CmdResult> {
        if entry.text.trim().is_empty() {
            return Err(TripDiaryError::Validation(
                "Entry text cannot be empty".to_string(),
            ));
        }
        if let (Some(lat), Some(lng)) = (entry.lat, entry.lng) {
            if !valid_coords(lat, lng) {
                return Err(TripDiaryError::Validation(format!(
                    "Coordinates out of range: {}, {}",
                    lat, lng
                )));
            }
        }

        let mut result = CmdResult::default();
        if self.state.find_trip(trip_id).is_some() {
            result.add_message(CmdMessage::success("Entry logged."));
        } else {
            // The store itself stays a silent no-op on an unmatched id; only
            // the returned message tells the caller nothing was logged.
            result.add_message(CmdMessage::warning(format!(
                "No trip with id {}; nothing logged",
                trip_id
            )));
        }
        self.state.add_diary_entry(trip_id, entry);
        self.write_through();
        Ok(result)
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> Result<CmdResult> {
        if vehicle.brand.trim().is_empty() {
            return Err(TripDiaryError::Validation(
                "Vehicle brand cannot be empty".to_string(),
            ));
        }

        let mut result = CmdResult::default().with_vehicles(vec![vehicle.clone()]);
        result.add_message(CmdMessage::success(format!(
            "Added vehicle: {}",
            vehicle.label()
        )));
        self.state.add_vehicle(vehicle);
        self.write_through();
        Ok(result)
    }

    pub fn delete_vehicle(&mut self, id: &str) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        match self.state.vehicles.iter().find(|v| v.id == id) {
            Some(vehicle) => {
                result.add_message(CmdMessage::success(format!(
                    "Deleted vehicle: {}",
                    vehicle.label()
                )));
            }
            None => result.add_message(CmdMessage::warning(format!("No vehicle with id {}", id))),
        }
        self.state.delete_vehicle(id);
        self.write_through();
        Ok(result)
    }

    pub fn set_current_trip(&mut self, trip_id: &str) -> Result<CmdResult> {
        self.state.set_current_trip(trip_id);
        self.write_through();

        let mut result = CmdResult::default();
        match &self.state.current_trip {
            Some(trip) => result.add_message(CmdMessage::info(format!(
                "Current trip: {}",
                trip.name
            ))),
            None => result.add_message(CmdMessage::warning(format!(
                "No trip with id {}; selection cleared",
                trip_id
            ))),
        }
        Ok(result)
    }

    pub fn delete_trip(&mut self, trip_id: &str) -> Result<CmdResult> {
        let mut result = CmdResult::default();
        match self.state.find_trip(trip_id) {
            Some(trip) => {
                result.add_message(CmdMessage::success(format!("Deleted trip: {}", trip.name)))
            }
            None => result.add_message(CmdMessage::warning(format!("No trip with id {}", trip_id))),
        }
        self.state.delete_trip(trip_id);
        self.write_through();
        Ok(result)
    }

    pub fn delete_diary_entry(&mut self, trip_id: &str, entry_id: &str) -> Result<CmdResult> {
        let matched = self
            .state
            .find_trip(trip_id)
            .is_some_and(|t| t.entries.iter().any(|e| e.id == entry_id));
        self.state.delete_diary_entry(trip_id, entry_id);
        self.write_through();

        let mut result = CmdResult::default();
        if matched {
            result.add_message(CmdMessage::success("Entry removed."));
        } else {
            result.add_message(CmdMessage::warning(format!(
                "No entry {} in trip {}",
                entry_id, trip_id
            )));
        }
        Ok(result)
    }

    pub fn update_trip(&mut self, trip_id: &str, patch: &TripPatch) -> Result<CmdResult> {
        if self.state.find_trip(trip_id).is_none() {
            return Err(TripDiaryError::TripNotFound(trip_id.to_string()));
        }
        self.state.update_trip(trip_id, patch);
        self.write_through();

        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success("Trip updated."));
        Ok(result)
    }

    /// Reset all collections and evict the persisted record from both
    /// storage backends.
    pub fn clear_all(&mut self) -> Result<CmdResult> {
        self.state.clear_all();
        self.persister.clear();

        let mut result = CmdResult::default();
        result.add_message(CmdMessage::success("All data cleared."));
        Ok(result)
    }

    /// Write `{trips, vehicles}` to a timestamped JSON file in `dir`.
    pub fn export_data(&self, dir: &Path) -> Result<CmdResult> {
        commands::export::run(&self.state, dir)
    }

    /// Replace both collections from an export file. A failed import leaves
    /// the state untouched and records the error for the UI.
    pub fn import_data(&mut self, path: &Path) -> Result<CmdResult> {
        match commands::import::run(&mut self.state, path) {
            Ok(result) => {
                self.write_through();
                Ok(result)
            }
            Err(e) => {
                self.state.set_error(Some(e.to_string()));
                Err(e)
            }
        }
    }

    // --- UI feedback passthroughs ---

    pub fn set_error(&mut self, error: Option<String>) {
        self.state.set_error(error);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.state.set_loading(loading);
    }

    /// Block until all queued durable writes have landed. Used by tests and
    /// at orderly shutdown; dropping the API flushes implicitly.
    pub fn flush(&self) {
        self.persister.flush();
    }
}
