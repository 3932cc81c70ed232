//! Dashboard summary: the headline counts the operations console shows.

use geoscout_backend::BackendClient;
use geoscout_core::Place;

struct DashboardStats {
    geofences: usize,
    places: usize,
    visited: usize,
}

impl DashboardStats {
    fn to_visit(&self) -> usize {
        self.places - self.visited
    }
}

fn tally(place_lists: &[Vec<Place>]) -> DashboardStats {
    let places: usize = place_lists.iter().map(Vec::len).sum();
    let visited = place_lists
        .iter()
        .flatten()
        .filter(|p| p.is_visited)
        .count();
    DashboardStats {
        geofences: place_lists.len(),
        places,
        visited,
    }
}

pub(crate) async fn run(backend: &BackendClient) -> anyhow::Result<()> {
    let geofences = backend.get_geofences().await?;

    let mut place_lists = Vec::with_capacity(geofences.len());
    for fence in &geofences {
        let Some(id) = fence.id.as_deref() else {
            continue;
        };
        place_lists.push(backend.places_in_geofence(id).await?);
    }

    let stats = tally(&place_lists);
    println!("Active geofences: {}", stats.geofences);
    println!("Saved places:     {}", stats.places);
    println!("Total visits:     {}", stats.visited);
    println!("Places to visit:  {}", stats.to_visit());
    Ok(())
}

#[cfg(test)]
mod tests {
    use geoscout_core::{Place, PlaceCandidate, Point};

    use super::*;

    fn place(geofence_id: &str, visited: bool) -> Place {
        let mut p = Place::from_candidate(
            geofence_id,
            PlaceCandidate {
                external_id: "ext".to_owned(),
                name: "Spot".to_owned(),
                address: String::new(),
                location: Point { lat: 0.0, lng: 0.0 },
                website: None,
                phone_number: None,
            },
        );
        p.is_visited = visited;
        p
    }

    #[test]
    fn tally_counts_across_geofences() {
        let lists = vec![
            vec![place("a", true), place("a", false)],
            vec![place("b", true)],
            vec![],
        ];
        let stats = tally(&lists);
        assert_eq!(stats.geofences, 3);
        assert_eq!(stats.places, 3);
        assert_eq!(stats.visited, 2);
        assert_eq!(stats.to_visit(), 1);
    }

    #[test]
    fn tally_of_nothing_is_all_zero() {
        let stats = tally(&[]);
        assert_eq!(stats.geofences, 0);
        assert_eq!(stats.places, 0);
        assert_eq!(stats.to_visit(), 0);
    }
}
