//! Strips inline base64 payloads out of a state tree before it is persisted.
//!
//! The live in-memory state may legitimately hold `data:` URIs while an
//! upload is in flight; none of them may survive a persistence cycle. The
//! transform deep-clones, never mutates its input, and is idempotent:
//! `strip(strip(s)) == strip(s)`.

use crate::model::{is_data_uri, ImageRef, Trip};
use crate::state::StateSnapshot;

/// Produce a copy of `snapshot` safe for durable storage.
pub fn strip_state(snapshot: &StateSnapshot) -> StateSnapshot {
    StateSnapshot {
        trips: snapshot.trips.iter().map(strip_trip).collect(),
        vehicles: snapshot.vehicles.clone(),
    }
}

fn strip_trip(trip: &Trip) -> Trip {
    let mut clean = trip.clone();

    // A data-URI cover is dropped outright rather than persisted.
    if clean.cover_image.as_deref().is_some_and(is_data_uri) {
        clean.cover_image = None;
    }

    for entry in &mut clean.entries {
        entry.images = entry.images.iter().filter_map(strip_image).collect();
    }

    clean
}

/// Per-element rules: bare `data:` strings and objects with a `data:` url are
/// dropped; bare non-data strings are normalized to the object shape; other
/// objects pass through unchanged.
fn strip_image(image: &ImageRef) -> Option<ImageRef> {
    match image {
        ImageRef::Url(url) if is_data_uri(url) => None,
        ImageRef::Url(url) => Some(ImageRef::from_url(url.clone())),
        ImageRef::Meta(meta) if is_data_uri(&meta.url) => None,
        ImageRef::Meta(_) => Some(image.clone()),
    }
}
