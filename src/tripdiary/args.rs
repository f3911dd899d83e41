use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tripdiary")]
#[command(about = "Personal travel log: trips, diary entries, vehicles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the data directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List trips
    #[command(alias = "ls")]
    List,

    /// View a trip and its diary entries
    #[command(alias = "v")]
    View {
        /// Trip id (or unique id prefix)
        trip: String,
    },

    /// Create a new trip
    #[command(alias = "n")]
    New {
        /// Trip name
        name: String,

        /// Province or region
        #[arg(long)]
        province: Option<String>,

        /// Start date (ISO, e.g. 2024-05-01)
        #[arg(long)]
        start: Option<String>,

        /// End date
        #[arg(long)]
        end: Option<String>,

        /// Vehicle id to attach
        #[arg(long)]
        vehicle: Option<String>,
    },

    /// Log a diary entry to a trip
    Log {
        /// Trip id (or unique id prefix); defaults to the current trip
        #[arg(long)]
        trip: Option<String>,

        /// Entry text
        text: String,

        /// Place name
        #[arg(long)]
        place: Option<String>,

        /// Latitude
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Image URL(s) to attach
        #[arg(long = "image", value_name = "URL")]
        images: Vec<String>,
    },

    /// Remove a diary entry from a trip
    RmEntry {
        /// Trip id (or unique id prefix)
        trip: String,

        /// Entry id (or unique id prefix)
        entry: String,
    },

    /// Delete a trip
    #[command(alias = "rm")]
    Delete {
        /// Trip id (or unique id prefix)
        trip: String,
    },

    /// Select the current trip
    Use {
        /// Trip id (or unique id prefix)
        trip: String,
    },

    /// Show the current trip
    Current,

    /// List vehicles
    Vehicles,

    /// Add a vehicle
    AddVehicle {
        /// Brand, e.g. Honda
        brand: String,

        /// Model, e.g. Wave
        model: String,

        /// License plate
        #[arg(long)]
        plate: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Remove a vehicle (trips that reference it keep their copy)
    RmVehicle {
        /// Vehicle id (or unique id prefix)
        vehicle: String,
    },

    /// Export all data to a timestamped JSON file
    Export {
        /// Directory to write into (defaults to the configured export dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Import trips and vehicles from an export file
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Delete all trips and vehicles and evict stored data
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
