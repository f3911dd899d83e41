use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, TripDiaryError};
use crate::state::{StateSnapshot, TripState};
use std::fs;
use std::path::Path;

/// Import a previously exported `{trips, vehicles}` file, replacing both
/// collections wholesale. On any parse or shape failure the state is left
/// unchanged and the error surfaces to the caller.
pub fn run(state: &mut TripState, path: &Path) -> Result<CmdResult> {
    let raw = fs::read_to_string(path).map_err(TripDiaryError::Io)?;
    let snapshot = parse_import(&raw)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Imported {} trips and {} vehicles from {}",
        snapshot.trips.len(),
        snapshot.vehicles.len(),
        path.display()
    )));
    state.replace_collections(snapshot);
    Ok(result)
}

/// A file is valid only if top-level `trips` and `vehicles` are both arrays.
/// Elements then pass through the tolerant model layer, which accepts both
/// historical shapes.
fn parse_import(raw: &str) -> Result<StateSnapshot> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| TripDiaryError::Validation(format!("Not a valid JSON file: {}", e)))?;

    let trips_ok = value.get("trips").is_some_and(|v| v.is_array());
    let vehicles_ok = value.get("vehicles").is_some_and(|v| v.is_array());
    if !trips_ok || !vehicles_ok {
        return Err(TripDiaryError::Validation(
            "Invalid file: missing trips or vehicles".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| TripDiaryError::Validation(format!("Unrecognized record shape: {}", e)))
}
