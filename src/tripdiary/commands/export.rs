use crate::commands::{CmdMessage, CmdResult};
use crate::error::{Result, TripDiaryError};
use crate::state::TripState;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Serialize `{trips, vehicles}` to a timestamped JSON file in `dir`.
///
/// Exports reflect the in-memory collections verbatim, including any
/// transient data URIs; only the durable store is stripped.
pub fn run(state: &TripState, dir: &Path) -> Result<CmdResult> {
    let path = dir.join(export_filename(Utc::now()));
    let file = File::create(&path).map_err(TripDiaryError::Io)?;
    write_json(file, state)?;

    let mut result = CmdResult::default().with_paths(vec![path.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Exported {} trips and {} vehicles to {}",
        state.trips.len(),
        state.vehicles.len(),
        path.display()
    )));
    Ok(result)
}

fn export_filename(now: DateTime<Utc>) -> String {
    format!("trip-diary-{}.json", now.timestamp_millis())
}

fn write_json<W: Write>(mut writer: W, state: &TripState) -> Result<()> {
    let data = state.snapshot();
    let json = serde_json::to_string_pretty(&data).map_err(TripDiaryError::Serialization)?;
    writer.write_all(json.as_bytes()).map_err(TripDiaryError::Io)?;
    Ok(())
}
