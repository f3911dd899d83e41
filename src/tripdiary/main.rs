use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tripdiary::api::TripDiaryApi;
use tripdiary::commands::{CmdMessage, MessageLevel};
use tripdiary::config::TripDiaryConfig;
use tripdiary::error::{Result, TripDiaryError};
use tripdiary::model::{image_url, DiaryEntry, Trip, Vehicle};
use tripdiary::store::adapter::DualStore;
use tripdiary::store::fs::FileBackend;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands};

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("com", "tripdiary", "tripdiary"));

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: TripDiaryApi,
    config: TripDiaryConfig,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::List) | None => handle_list(&ctx),
        Some(Commands::View { trip }) => handle_view(&ctx, &trip),
        Some(Commands::New {
            name,
            province,
            start,
            end,
            vehicle,
        }) => handle_new(&mut ctx, name, province, start, end, vehicle),
        Some(Commands::Log {
            trip,
            text,
            place,
            lat,
            lng,
            images,
        }) => handle_log(&mut ctx, trip, text, place, lat, lng, images),
        Some(Commands::RmEntry { trip, entry }) => handle_rm_entry(&mut ctx, &trip, &entry),
        Some(Commands::Delete { trip }) => handle_delete(&mut ctx, &trip),
        Some(Commands::Use { trip }) => handle_use(&mut ctx, &trip),
        Some(Commands::Current) => handle_current(&ctx),
        Some(Commands::Vehicles) => handle_vehicles(&ctx),
        Some(Commands::AddVehicle {
            brand,
            model,
            plate,
            notes,
        }) => handle_add_vehicle(&mut ctx, brand, model, plate, notes),
        Some(Commands::RmVehicle { vehicle }) => handle_rm_vehicle(&mut ctx, &vehicle),
        Some(Commands::Export { dir }) => handle_export(&ctx, dir),
        Some(Commands::Import { file }) => handle_import(&mut ctx, file),
        Some(Commands::Clear { yes }) => handle_clear(&mut ctx, yes),
    }
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => PROJECT_DIRS
            .as_ref()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".tripdiary")),
    };

    // Releases before the envelope moved to the data dir kept the record in
    // the config dir; it is consulted once and migrated on first read.
    let mut store = DualStore::new(Box::new(FileBackend::new(data_dir.clone())));
    if cli.data_dir.is_none() {
        if let Some(dirs) = PROJECT_DIRS.as_ref() {
            let legacy_dir = dirs.config_dir().to_path_buf();
            if legacy_dir != data_dir {
                store = store.with_legacy(Box::new(FileBackend::new(legacy_dir)));
            }
        }
    }

    let config = TripDiaryConfig::load(&data_dir).unwrap_or_default();
    Ok(AppContext {
        api: TripDiaryApi::new(store),
        config,
    })
}

fn handle_list(ctx: &AppContext) -> Result<()> {
    print_trips(ctx.api.trips(), ctx.api.current_trip());
    Ok(())
}

fn handle_view(ctx: &AppContext, trip: &str) -> Result<()> {
    let id = resolve_trip_id(&ctx.api, trip)?;
    let trip = ctx
        .api
        .find_trip(&id)
        .ok_or_else(|| TripDiaryError::TripNotFound(id.clone()))?;
    print_trip_detail(trip);
    Ok(())
}

fn handle_new(
    ctx: &mut AppContext,
    name: String,
    province: Option<String>,
    start: Option<String>,
    end: Option<String>,
    vehicle: Option<String>,
) -> Result<()> {
    let mut trip = Trip::new(name);
    trip.province = province;
    trip.started_at = start;
    trip.ended_at = end;
    if let Some(vehicle_ref) = vehicle {
        let vid = resolve_vehicle_id(&ctx.api, &vehicle_ref)?;
        trip.vehicle = ctx.api.vehicles().iter().find(|v| v.id == vid).cloned();
    }

    let id = trip.id.clone();
    let result = ctx.api.add_trip(trip)?;
    print_messages(&result.messages);
    println!("{}", format!("id: {}", id).dimmed());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_log(
    ctx: &mut AppContext,
    trip: Option<String>,
    text: String,
    place: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    images: Vec<String>,
) -> Result<()> {
    let trip_id = match trip {
        Some(t) => resolve_trip_id(&ctx.api, &t)?,
        None => ctx
            .api
            .current_trip()
            .map(|t| t.id.clone())
            .ok_or_else(|| {
                TripDiaryError::Api("No current trip; pass --trip or run `tripdiary use`".into())
            })?,
    };

    let mut entry = DiaryEntry::new(text);
    entry.location_name = place;
    entry.lat = lat;
    entry.lng = lng;
    entry.images = images
        .into_iter()
        .map(tripdiary::model::ImageRef::from_url)
        .collect();

    let result = ctx.api.add_diary_entry(&trip_id, entry)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_rm_entry(ctx: &mut AppContext, trip: &str, entry: &str) -> Result<()> {
    let trip_id = resolve_trip_id(&ctx.api, trip)?;
    let entry_id = resolve_entry_id(&ctx.api, &trip_id, entry)?;
    let result = ctx.api.delete_diary_entry(&trip_id, &entry_id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, trip: &str) -> Result<()> {
    let id = resolve_trip_id(&ctx.api, trip)?;
    let result = ctx.api.delete_trip(&id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_use(ctx: &mut AppContext, trip: &str) -> Result<()> {
    let id = resolve_trip_id(&ctx.api, trip)?;
    let result = ctx.api.set_current_trip(&id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_current(ctx: &AppContext) -> Result<()> {
    match ctx.api.current_trip() {
        Some(trip) => print_trip_detail(trip),
        None => println!("No current trip."),
    }
    Ok(())
}

fn handle_vehicles(ctx: &AppContext) -> Result<()> {
    let vehicles = ctx.api.vehicles();
    if vehicles.is_empty() {
        println!("No vehicles.");
        return Ok(());
    }
    for v in vehicles {
        let mut line = format!("{}  {}", short_id(&v.id).dimmed(), v.label().bold());
        if let Some(plate) = &v.plate {
            line.push_str(&format!("  [{}]", plate));
        }
        if let Some(notes) = &v.notes {
            line.push_str(&format!("  {}", notes.dimmed()));
        }
        println!("{}", line);
    }
    Ok(())
}

fn handle_add_vehicle(
    ctx: &mut AppContext,
    brand: String,
    model: String,
    plate: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let mut vehicle = Vehicle::new(brand, model);
    vehicle.plate = plate;
    vehicle.notes = notes;

    let id = vehicle.id.clone();
    let result = ctx.api.add_vehicle(vehicle)?;
    print_messages(&result.messages);
    println!("{}", format!("id: {}", id).dimmed());
    Ok(())
}

fn handle_rm_vehicle(ctx: &mut AppContext, vehicle: &str) -> Result<()> {
    let id = resolve_vehicle_id(&ctx.api, vehicle)?;
    let result = ctx.api.delete_vehicle(&id)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext, dir: Option<PathBuf>) -> Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let dir = dir.unwrap_or_else(|| ctx.config.export_dir_or(&cwd));
    let result = ctx.api.export_data(&dir)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, file: PathBuf) -> Result<()> {
    let result = ctx.api.import_data(&file)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_clear(ctx: &mut AppContext, yes: bool) -> Result<()> {
    if !yes {
        println!(
            "{}",
            "This deletes every trip and vehicle. Re-run with --yes to confirm.".yellow()
        );
        return Ok(());
    }
    let result = ctx.api.clear_all()?;
    print_messages(&result.messages);
    Ok(())
}

// --- Id resolution ---
//
// Ids are UUIDs; typing them out is miserable, so every command accepts a
// unique prefix.

fn resolve_id<'a, I>(ids: I, input: &str, kind: &str) -> Result<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut matches: Vec<&str> = Vec::new();
    for id in ids {
        if id == input {
            return Ok(id.to_string());
        }
        if id.starts_with(input) {
            matches.push(id);
        }
    }
    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(TripDiaryError::Api(format!(
            "No {} matching '{}'",
            kind, input
        ))),
        _ => Err(TripDiaryError::Api(format!(
            "Ambiguous {} id '{}' ({} matches)",
            kind,
            input,
            matches.len()
        ))),
    }
}

fn resolve_trip_id(api: &TripDiaryApi, input: &str) -> Result<String> {
    resolve_id(api.trips().iter().map(|t| t.id.as_str()), input, "trip")
}

fn resolve_vehicle_id(api: &TripDiaryApi, input: &str) -> Result<String> {
    resolve_id(
        api.vehicles().iter().map(|v| v.id.as_str()),
        input,
        "vehicle",
    )
}

fn resolve_entry_id(api: &TripDiaryApi, trip_id: &str, input: &str) -> Result<String> {
    let trip = api
        .find_trip(trip_id)
        .ok_or_else(|| TripDiaryError::TripNotFound(trip_id.to_string()))?;
    resolve_id(trip.entries.iter().map(|e| e.id.as_str()), input, "entry")
}

// --- Rendering ---

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;

fn print_trips(trips: &[Trip], current: Option<&Trip>) {
    if trips.is_empty() {
        println!("No trips yet. Start one with `tripdiary new <name>`.");
        return;
    }

    for trip in trips {
        let is_current = current.is_some_and(|c| c.id == trip.id);
        let marker = if is_current { "▸ " } else { "  " };

        let id_str = format!("{}  ", short_id(&trip.id));
        let mut label = trip.name.clone();
        if let Some(province) = &trip.province {
            label.push_str(&format!(" ({})", province));
        }
        let entries = format!("  {} entries", trip.entries.len());

        let time_ago = trip
            .entries
            .last()
            .map(|e| format_time_ago(&e.created_at))
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));

        let fixed = marker.width() + id_str.width() + entries.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let label_display = truncate_to_width(&label, available);
        let padding = available.saturating_sub(label_display.width());

        let name_colored = if is_current {
            label_display.bold()
        } else {
            label_display.normal()
        };

        println!(
            "{}{}{}{}{}{}",
            marker,
            id_str.dimmed(),
            name_colored,
            " ".repeat(padding),
            entries.dimmed(),
            time_ago.dimmed()
        );
    }
}

fn print_trip_detail(trip: &Trip) {
    let mut heading = trip.name.clone();
    if let Some(province) = &trip.province {
        heading.push_str(&format!(" ({})", province));
    }
    println!("{}  {}", heading.bold(), short_id(&trip.id).dimmed());

    match (trip.start(), trip.end()) {
        (Some(start), Some(end)) => println!("{} → {}", start, end),
        (Some(start), None) => println!("from {}", start),
        _ => {}
    }
    if let Some(vehicle) = &trip.vehicle {
        println!("by {}", vehicle.label());
    }
    if let Some(description) = &trip.description {
        println!("{}", description);
    }

    if trip.entries.is_empty() {
        println!("\nNo entries yet.");
        return;
    }

    println!("--------------------------------");
    for entry in &trip.entries {
        println!(
            "{}  {} {}",
            short_id(&entry.id).dimmed(),
            entry.created_at.dimmed(),
            format_time_ago(&entry.created_at).dimmed()
        );
        println!("{}", entry.text);
        if let Some(place) = &entry.location_name {
            match (entry.lat, entry.lng) {
                (Some(lat), Some(lng)) => {
                    println!("{}", format!("@ {} ({:.4}, {:.4})", place, lat, lng).cyan())
                }
                _ => println!("{}", format!("@ {}", place).cyan()),
            }
        }
        for image in &entry.images {
            if let Some(url) = image_url(image) {
                println!("{}", url.underline().dimmed());
            }
        }
        println!();
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(iso: &str) -> String {
    let Ok(timestamp) = DateTime::parse_from_rfc3339(iso) else {
        return " ".repeat(TIME_WIDTH);
    };
    let duration = Utc::now().signed_duration_since(timestamp.with_timezone(&Utc));
    let time_str = timeago::Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
