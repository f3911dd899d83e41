//! Core data types: [`Trip`], [`DiaryEntry`], [`Vehicle`], [`ImageMeta`].
//!
//! Two generations of the on-disk shapes exist in the wild. Entries were once
//! `{ id, timestamp, description, location: {lat, lng, name}, images: [string] }`
//! and vehicles `{ id, name, type, description, image }`. Deserialization
//! accepts both generations and normalizes to the canonical structs below, so
//! imported and previously persisted data keeps loading. Serialization always
//! emits the canonical shape.
//!
//! Ids are plain strings (freshly generated ones are UUID v4) so legacy ids of
//! any format survive a round-trip.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking an inline base64 payload rather than a fetchable URL.
pub const DATA_URI_PREFIX: &str = "data:";

/// A reference to an uploaded media asset. Never embeds binary data once
/// persisted; `id` is the media host's public id and may be empty for
/// references recovered from bare URL strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// An image as it may appear in entry data: either the canonical metadata
/// object or a bare URL string (legacy shape, and the transient form a data
/// URI takes while an upload is still in flight).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Meta(ImageMeta),
    Url(String),
}

impl ImageRef {
    pub fn from_url(url: impl Into<String>) -> Self {
        ImageRef::Meta(ImageMeta {
            id: String::new(),
            url: url.into(),
            width: None,
            height: None,
            mime: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VehicleWire")]
pub struct Vehicle {
    pub id: String,
    pub brand: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Vehicle {
    pub fn new(brand: String, model: String) -> Self {
        Self {
            id: gen_id(),
            brand,
            model,
            plate: None,
            notes: None,
        }
    }

    /// Display label, e.g. "Honda Wave".
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model).trim().to_string()
    }
}

/// Accepts both vehicle generations: canonical `{id, brand, model, plate,
/// notes}` and legacy `{id, name, type, description, image}`. Legacy `name`
/// maps to `brand`, `type` to `model`, `description` to `notes`; the legacy
/// `image` field is dropped.
#[derive(Deserialize)]
struct VehicleWire {
    #[serde(default)]
    id: String,
    brand: Option<String>,
    model: Option<String>,
    plate: Option<String>,
    notes: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
}

impl From<VehicleWire> for Vehicle {
    fn from(w: VehicleWire) -> Self {
        Vehicle {
            id: if w.id.is_empty() { gen_id() } else { w.id },
            brand: w.brand.or(w.name).unwrap_or_default(),
            model: w.model.or(w.kind).unwrap_or_default(),
            plate: w.plate,
            notes: w.notes.or(w.description),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "EntryWire")]
pub struct DiaryEntry {
    pub id: String,
    /// ISO 8601 timestamp. Kept as a string so values written by older
    /// versions (arbitrary precision, offsets) round-trip untouched.
    pub created_at: String,
    pub text: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl DiaryEntry {
    pub fn new(text: String) -> Self {
        Self {
            id: gen_id(),
            created_at: Utc::now().to_rfc3339(),
            text,
            images: Vec::new(),
            location_name: None,
            lat: None,
            lng: None,
        }
    }
}

/// Accepts both entry generations: canonical `{id, createdAt, text, images,
/// locationName, lat, lng}` and legacy `{id, timestamp, description,
/// location: {lat, lng, name}, images}`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryWire {
    #[serde(default)]
    id: String,
    created_at: Option<String>,
    timestamp: Option<String>,
    text: Option<String>,
    description: Option<String>,
    #[serde(default)]
    images: Vec<ImageRef>,
    location_name: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    location: Option<LocationWire>,
}

#[derive(Deserialize)]
struct LocationWire {
    lat: Option<f64>,
    lng: Option<f64>,
    name: Option<String>,
}

impl From<EntryWire> for DiaryEntry {
    fn from(w: EntryWire) -> Self {
        let location = w.location.unwrap_or(LocationWire {
            lat: None,
            lng: None,
            name: None,
        });
        DiaryEntry {
            id: if w.id.is_empty() { gen_id() } else { w.id },
            created_at: w
                .created_at
                .or(w.timestamp)
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
            text: w.text.or(w.description).unwrap_or_default(),
            images: w.images,
            location_name: w.location_name.or(location.name),
            lat: w.lat.or(location.lat),
            lng: w.lng.or(location.lng),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    // Older trips carry startDate/endDate instead of startedAt/endedAt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
    #[serde(default)]
    pub entries: Vec<DiaryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Trip {
    pub fn new(name: String) -> Self {
        Self {
            id: gen_id(),
            name,
            province: None,
            started_at: None,
            ended_at: None,
            start_date: None,
            end_date: None,
            vehicle: None,
            entries: Vec::new(),
            cover_image: None,
            description: None,
        }
    }

    /// Start date regardless of which field generation the trip carries.
    pub fn start(&self) -> Option<&str> {
        self.started_at.as_deref().or(self.start_date.as_deref())
    }

    /// End date regardless of which field generation the trip carries.
    pub fn end(&self) -> Option<&str> {
        self.ended_at.as_deref().or(self.end_date.as_deref())
    }
}

/// Generate a fresh id (UUID v4).
pub fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn is_data_uri(s: &str) -> bool {
    s.starts_with(DATA_URI_PREFIX)
}

/// Resolve an image reference to a renderable URL, accepting both the bare
/// string and object shapes. Returns `None` for malformed or id-only
/// references.
pub fn image_url(image: &ImageRef) -> Option<&str> {
    match image {
        ImageRef::Url(s) if !s.is_empty() => Some(s),
        ImageRef::Meta(meta) if !meta.url.is_empty() => Some(&meta.url),
        _ => None,
    }
}

/// Whether a coordinate pair lies within valid latitude/longitude bounds.
pub fn valid_coords(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}
