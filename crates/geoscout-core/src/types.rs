//! Domain types shared across the geoscout workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WGS-84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

/// Shape of a geofence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeofenceKind {
    Circle,
    Polygon,
}

/// A user-defined region of interest.
///
/// For [`GeofenceKind::Circle`], `boundary` holds exactly the center point and
/// `radius_m` is required. For [`GeofenceKind::Polygon`], `boundary` holds the
/// ring vertices (at least three) and `radius_m` is absent. `kind` decides
/// which representation is authoritative; the two are never partially
/// populated.
///
/// A geofence is created without an `id`; the backend assigns one on first
/// save. Once saved, only `name` is editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geofence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub kind: GeofenceKind,
    pub boundary: Vec<Point>,
    #[serde(
        default,
        rename = "radius",
        skip_serializing_if = "Option::is_none"
    )]
    pub radius_m: Option<f64>,
}

impl Geofence {
    /// An unsaved circular geofence.
    #[must_use]
    pub fn circle(name: impl Into<String>, center: Point, radius_m: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: GeofenceKind::Circle,
            boundary: vec![center],
            radius_m: Some(radius_m),
        }
    }

    /// An unsaved polygonal geofence over a closed ring of vertices.
    #[must_use]
    pub fn polygon(name: impl Into<String>, ring: Vec<Point>) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind: GeofenceKind::Polygon,
            boundary: ring,
            radius_m: None,
        }
    }
}

/// A place returned by the search provider, not yet persisted.
///
/// `website` and `phone_number` are filled by the details-enrichment step
/// when the provider has them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub external_id: String,
    pub name: String,
    pub address: String,
    pub location: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Contact role recorded for a place's point of contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactPosition {
    Manager,
    #[serde(rename = "Store Clerk")]
    StoreClerk,
    #[serde(rename = "Sales Attendant")]
    SalesAttendant,
    Owner,
}

/// A persisted place inside a geofence.
///
/// `external_id` is the provider's place identifier and is unique within a
/// given `geofence_id`; the discovery pipeline deduplicates on it before
/// anything reaches the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub geofence_id: String,
    pub external_id: String,
    pub name: String,
    pub address: String,
    pub location: Point,
    pub is_visited: bool,
    #[serde(default)]
    pub visited_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_of_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ContactPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Place {
    /// Promotes a search candidate into an unsaved place for `geofence_id`.
    #[must_use]
    pub fn from_candidate(geofence_id: impl Into<String>, candidate: PlaceCandidate) -> Self {
        Self {
            id: None,
            geofence_id: geofence_id.into(),
            external_id: candidate.external_id,
            name: candidate.name,
            address: candidate.address,
            location: candidate.location,
            is_visited: false,
            visited_at: None,
            notes: None,
            website: candidate.website,
            phone_number: candidate.phone_number,
            point_of_contact: None,
            position: None,
            email: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geofence_kind_serializes_lowercase() {
        let json = serde_json::to_string(&GeofenceKind::Circle).unwrap();
        assert_eq!(json, r#""circle""#);
        let json = serde_json::to_string(&GeofenceKind::Polygon).unwrap();
        assert_eq!(json, r#""polygon""#);
    }

    #[test]
    fn circle_geofence_serializes_radius_field() {
        let fence = Geofence::circle("Osu", Point { lat: 5.60, lng: -0.19 }, 500.0);
        let value = serde_json::to_value(&fence).unwrap();
        assert_eq!(value["kind"], "circle");
        assert_eq!(value["radius"], 500.0);
        assert_eq!(value["boundary"].as_array().unwrap().len(), 1);
        assert!(value.get("id").is_none(), "unsaved geofence omits id");
    }

    #[test]
    fn polygon_geofence_omits_radius() {
        let ring = vec![
            Point { lat: 0.0, lng: 0.0 },
            Point { lat: 0.0, lng: 1.0 },
            Point { lat: 1.0, lng: 0.0 },
        ];
        let fence = Geofence::polygon("Triangle", ring);
        let value = serde_json::to_value(&fence).unwrap();
        assert!(value.get("radius").is_none());
    }

    #[test]
    fn contact_position_round_trips_display_strings() {
        let json = serde_json::to_string(&ContactPosition::StoreClerk).unwrap();
        assert_eq!(json, r#""Store Clerk""#);
        let parsed: ContactPosition = serde_json::from_str(r#""Sales Attendant""#).unwrap();
        assert_eq!(parsed, ContactPosition::SalesAttendant);
    }

    #[test]
    fn place_from_candidate_starts_unvisited() {
        let candidate = PlaceCandidate {
            external_id: "ext-1".to_owned(),
            name: "Chez Afia".to_owned(),
            address: "12 Oxford St".to_owned(),
            location: Point { lat: 5.56, lng: -0.20 },
            website: Some("https://chezafia.example".to_owned()),
            phone_number: None,
        };
        let place = Place::from_candidate("gf-9", candidate);
        assert_eq!(place.geofence_id, "gf-9");
        assert_eq!(place.external_id, "ext-1");
        assert!(!place.is_visited);
        assert!(place.visited_at.is_none());
        assert!(place.id.is_none());
        assert_eq!(place.website.as_deref(), Some("https://chezafia.example"));
    }

    #[test]
    fn place_deserializes_with_missing_optional_fields() {
        let json = serde_json::json!({
            "id": "p-1",
            "geofence_id": "gf-1",
            "external_id": "ext-1",
            "name": "Spot Bar",
            "address": "Ring Road",
            "location": { "lat": 5.58, "lng": -0.22 },
            "is_visited": false
        });
        let place: Place = serde_json::from_value(json).unwrap();
        assert!(place.visited_at.is_none());
        assert!(place.notes.is_none());
        assert!(place.position.is_none());
    }
}
