//! Seam between the discovery pipeline and the external places provider.
//!
//! The pipeline only sees [`PlaceSearchProvider`]; production wires in
//! [`crate::google::GooglePlacesClient`] and tests script the trait over
//! canned pages.

use geoscout_core::{PlaceCandidate, Point};
use serde::Deserialize;

use crate::error::PlacesError;

/// What to search for within the query area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKind {
    /// Structural nearby search by provider category (e.g. `restaurant`).
    Nearby { place_type: String },
    /// Free-text keyword search (e.g. `cafe`).
    Text { query: String },
}

/// A single search call against the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub location: Point,
    pub radius_m: f64,
    pub kind: SearchKind,
    /// Cursor from the previous page, absent on the first call.
    pub page_token: Option<String>,
}

/// One page of provider results plus the cursor for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub results: Vec<RawPlace>,
    pub next_page_token: Option<String>,
}

/// A place result exactly as the provider returns it.
///
/// Every field is optional on the wire; [`RawPlace::into_candidate`] fills
/// defaults instead of failing on partial data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPlace {
    pub place_id: Option<String>,
    pub name: Option<String>,
    /// Short address, populated by nearby search.
    pub vicinity: Option<String>,
    /// Full address, populated by text search.
    pub formatted_address: Option<String>,
    pub geometry: Option<RawGeometry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGeometry {
    pub location: Option<RawLatLng>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawLatLng {
    pub lat: f64,
    pub lng: f64,
}

impl RawPlace {
    /// Maps a raw result into a candidate, defaulting missing fields to
    /// empty strings / zero coordinates.
    #[must_use]
    pub fn into_candidate(self) -> PlaceCandidate {
        let location = self
            .geometry
            .and_then(|g| g.location)
            .map_or(Point { lat: 0.0, lng: 0.0 }, |l| Point {
                lat: l.lat,
                lng: l.lng,
            });

        PlaceCandidate {
            external_id: self.place_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            address: self.vicinity.or(self.formatted_address).unwrap_or_default(),
            location,
            website: None,
            phone_number: None,
        }
    }
}

/// Extra per-place fields fetched by the enrichment step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    pub website: Option<String>,
    #[serde(rename = "formatted_phone_number")]
    pub phone_number: Option<String>,
}

/// Search capability supplied by the maps collaborator.
#[async_trait::async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    /// Issues one search call and returns a single page of results.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::PaginationNotReady`] when a supplied page token has
    ///   not activated yet.
    /// - [`PlacesError::Search`] for any other non-OK provider status.
    /// - [`PlacesError::Http`] / [`PlacesError::Deserialize`] on transport
    ///   or response-shape failures.
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, PlacesError>;

    /// Fetches website and phone number for a single place.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Search`] when the provider reports a non-OK
    /// status for the place.
    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError>;
}
