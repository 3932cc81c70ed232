//! Geofence geometry: search-area resolution and containment tests.
//!
//! The resolver turns either geofence shape into a center/radius pair a
//! nearby-search call can consume. Polygon resolution is deliberately
//! over-inclusive (mean-of-vertices center, farthest-vertex radius); the
//! containment filter trims the excess against the true ring afterwards.

use geoscout_core::{Geofence, GeofenceKind, Point};

use crate::error::PlacesError;

/// Mean Earth radius in meters, used by the haversine distance.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Query center and bounding radius for a nearby-search call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub center: Point,
    pub radius_m: f64,
}

/// Great-circle distance between two points in meters (haversine).
#[must_use]
pub fn haversine_distance_m(a: Point, b: Point) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Resolves a geofence into a query center and bounding radius.
///
/// Circles resolve to their stored center and radius unchanged. Polygons
/// resolve to the arithmetic mean of their vertices and the distance from
/// that center to the farthest vertex — not a minimum enclosing circle, so
/// the radius covers every vertex with slack rather than tightly.
///
/// # Errors
///
/// Returns [`PlacesError::InvalidGeofence`] if the boundary is empty, a
/// circle has no positive radius, or a polygon has fewer than three vertices.
pub fn resolve(geofence: &Geofence) -> Result<SearchArea, PlacesError> {
    if geofence.boundary.is_empty() {
        return Err(invalid("boundary is empty"));
    }

    match geofence.kind {
        GeofenceKind::Circle => {
            let radius_m = match geofence.radius_m {
                Some(r) if r > 0.0 => r,
                _ => return Err(invalid("circle requires a positive radius")),
            };
            Ok(SearchArea {
                center: geofence.boundary[0],
                radius_m,
            })
        }
        GeofenceKind::Polygon => {
            let ring = &geofence.boundary;
            if ring.len() < 3 {
                return Err(invalid("polygon requires at least three vertices"));
            }

            #[allow(clippy::cast_precision_loss)]
            let n = ring.len() as f64;
            let center = Point {
                lat: ring.iter().map(|p| p.lat).sum::<f64>() / n,
                lng: ring.iter().map(|p| p.lng).sum::<f64>() / n,
            };
            let radius_m = ring
                .iter()
                .map(|&vertex| haversine_distance_m(center, vertex))
                .fold(0.0_f64, f64::max);

            Ok(SearchArea { center, radius_m })
        }
    }
}

/// Tests whether `point` lies within the geofence's true shape.
///
/// Circles are boundary-inclusive: a point at exactly the stored radius is
/// inside. Points exactly on a polygon edge may land on either side of the
/// ray-casting test; the ring boundary is not a guaranteed surface.
///
/// # Errors
///
/// Rejects the same malformed geofences as [`resolve`].
pub fn contains(geofence: &Geofence, point: Point) -> Result<bool, PlacesError> {
    if geofence.boundary.is_empty() {
        return Err(invalid("boundary is empty"));
    }

    match geofence.kind {
        GeofenceKind::Circle => {
            let radius_m = match geofence.radius_m {
                Some(r) if r > 0.0 => r,
                _ => return Err(invalid("circle requires a positive radius")),
            };
            Ok(haversine_distance_m(geofence.boundary[0], point) <= radius_m)
        }
        GeofenceKind::Polygon => {
            if geofence.boundary.len() < 3 {
                return Err(invalid("polygon requires at least three vertices"));
            }
            Ok(point_in_ring(point, &geofence.boundary))
        }
    }
}

/// Ray-casting point-in-polygon test over a closed ring of vertices.
fn point_in_ring(point: Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.lat > point.lat) != (pj.lat > point.lat) {
            let lng_at_lat =
                (pj.lng - pi.lng) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lng;
            if point.lng < lng_at_lat {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn invalid(reason: &str) -> PlacesError {
    PlacesError::InvalidGeofence {
        reason: reason.to_owned(),
    }
}
