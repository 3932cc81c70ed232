//! Containment filtering and candidate deduplication.

use std::collections::HashSet;

use geoscout_core::{Geofence, PlaceCandidate};

use crate::error::PlacesError;
use crate::geometry;

/// Drops candidates outside the geofence's true boundary, then collapses
/// duplicates by external id.
///
/// The bounding radius used for searching over-covers polygons, so every
/// combined result set is re-tested against the real shape here. First
/// occurrence wins on duplicate ids; insertion order is otherwise preserved.
/// An empty result is a normal outcome, not an error.
///
/// # Errors
///
/// Rejects the same malformed geofences as [`geometry::resolve`].
pub fn filter_and_dedupe(
    candidates: Vec<PlaceCandidate>,
    geofence: &Geofence,
) -> Result<Vec<PlaceCandidate>, PlacesError> {
    // Validate the shape once up front so a malformed geofence is rejected
    // even when there is nothing to filter.
    geometry::resolve(geofence)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::new();

    for candidate in candidates {
        if !geometry::contains(geofence, candidate.location)? {
            continue;
        }
        if seen.insert(candidate.external_id.clone()) {
            kept.push(candidate);
        }
    }

    Ok(kept)
}
