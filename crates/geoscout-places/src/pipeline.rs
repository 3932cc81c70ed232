//! Geofenced place-discovery orchestration.
//!
//! One discovery run resolves the geofence geometry once, executes a fixed
//! sequence of search passes strictly one after another (the provider and
//! its rate limits assume serialized access), and reduces the combined
//! results to a unique, contained candidate set. Progress is reported after
//! each pass for the calling surface to render.

use std::time::Duration;

use geoscout_core::{Geofence, PlaceCandidate};

use crate::error::PlacesError;
use crate::filter::filter_and_dedupe;
use crate::geometry;
use crate::provider::{PlaceSearchProvider, SearchKind, SearchRequest};
use crate::search::{run_search, SearchPolicy};

/// Progress snapshot reported to the caller after each search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryProgress {
    /// Raw candidates accumulated so far, before filtering and dedup.
    pub candidates_so_far: usize,
    pub passes_completed: usize,
    pub passes_total: usize,
}

/// Search passes for one discovery run: one structural nearby pass plus any
/// number of keyword text passes.
#[derive(Debug, Clone)]
pub struct SearchTerms {
    pub nearby_type: String,
    pub text_queries: Vec<String>,
}

impl SearchTerms {
    /// The food-and-drink catalog the operations console offers by default.
    #[must_use]
    pub fn food_and_drink() -> Self {
        Self {
            nearby_type: "restaurant".to_owned(),
            text_queries: [
                "cafe",
                "bar",
                "bakery",
                "meal_delivery",
                "meal_takeaway",
                "food",
            ]
            .iter()
            .map(|s| (*s).to_owned())
            .collect(),
        }
    }
}

impl Default for SearchTerms {
    fn default() -> Self {
        Self::food_and_drink()
    }
}

/// Pacing policy for a discovery run.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryPolicy {
    pub search: SearchPolicy,
    /// Courtesy wait between passes so the provider is not hammered
    /// back-to-back; not required for correctness.
    pub inter_pass_delay_ms: u64,
}

impl Default for DiscoveryPolicy {
    fn default() -> Self {
        Self {
            search: SearchPolicy::default(),
            inter_pass_delay_ms: 1_000,
        }
    }
}

/// Discovers unique places inside a geofence.
///
/// Runs the nearby pass and each text pass sequentially, accumulating raw
/// candidates, then applies containment filtering and dedup once over the
/// combined set. Surviving candidates get a best-effort details enrichment
/// (website, phone number); a details failure keeps the bare candidate.
///
/// `on_progress` fires after every completed pass.
///
/// # Errors
///
/// - [`PlacesError::InvalidGeofence`] before any search is issued.
/// - Any unrecovered search error aborts the remaining passes; candidates
///   from already-completed passes are discarded with it.
pub async fn discover_places<P, F>(
    provider: &P,
    geofence: &Geofence,
    terms: &SearchTerms,
    policy: &DiscoveryPolicy,
    mut on_progress: F,
) -> Result<Vec<PlaceCandidate>, PlacesError>
where
    P: PlaceSearchProvider + ?Sized,
    F: FnMut(DiscoveryProgress),
{
    let area = geometry::resolve(geofence)?;

    let passes: Vec<SearchKind> = std::iter::once(SearchKind::Nearby {
        place_type: terms.nearby_type.clone(),
    })
    .chain(terms.text_queries.iter().map(|query| SearchKind::Text {
        query: query.clone(),
    }))
    .collect();
    let passes_total = passes.len();

    let mut combined: Vec<PlaceCandidate> = Vec::new();

    for (index, kind) in passes.into_iter().enumerate() {
        if index > 0 && policy.inter_pass_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(policy.inter_pass_delay_ms)).await;
        }

        let request = SearchRequest {
            location: area.center,
            radius_m: area.radius_m,
            kind,
            page_token: None,
        };
        let found = run_search(provider, &request, &policy.search).await?;

        tracing::info!(
            pass = index + 1,
            passes_total,
            found = found.len(),
            "search pass complete"
        );

        combined.extend(found);
        on_progress(DiscoveryProgress {
            candidates_so_far: combined.len(),
            passes_completed: index + 1,
            passes_total,
        });
    }

    let mut unique = filter_and_dedupe(combined, geofence)?;
    enrich_details(provider, &mut unique).await;
    Ok(unique)
}

/// Best-effort website/phone enrichment for the final candidate set.
///
/// A failed details lookup keeps the bare candidate and logs at debug; it
/// never fails the pipeline.
async fn enrich_details<P>(provider: &P, candidates: &mut [PlaceCandidate])
where
    P: PlaceSearchProvider + ?Sized,
{
    for candidate in candidates.iter_mut() {
        if candidate.external_id.is_empty() {
            continue;
        }
        match provider.place_details(&candidate.external_id).await {
            Ok(details) => {
                candidate.website = details.website;
                candidate.phone_number = details.phone_number;
            }
            Err(err) => {
                tracing::debug!(
                    external_id = %candidate.external_id,
                    error = %err,
                    "place details unavailable"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use geoscout_core::{Geofence, Point};

    use super::*;
    use crate::provider::{PlaceDetails, RawGeometry, RawLatLng, RawPlace, SearchPage};

    /// Provider that replays one scripted page per pass and serves details
    /// for a fixed set of ids.
    struct PassProvider {
        pages: Mutex<Vec<Result<SearchPage, PlacesError>>>,
        requests: Mutex<Vec<SearchRequest>>,
        details: Vec<(String, PlaceDetails)>,
    }

    impl PassProvider {
        fn new(pages: Vec<Result<SearchPage, PlacesError>>) -> Self {
            Self {
                pages: Mutex::new(pages),
                requests: Mutex::new(Vec::new()),
                details: Vec::new(),
            }
        }

        fn with_details(mut self, id: &str, website: &str) -> Self {
            self.details.push((
                id.to_owned(),
                PlaceDetails {
                    website: Some(website.to_owned()),
                    phone_number: Some("+233 30 000 0000".to_owned()),
                },
            ));
            self
        }
    }

    #[async_trait::async_trait]
    impl PlaceSearchProvider for PassProvider {
        async fn search(&self, request: &SearchRequest) -> Result<SearchPage, PlacesError> {
            self.requests.lock().unwrap().push(request.clone());
            let mut pages = self.pages.lock().unwrap();
            assert!(!pages.is_empty(), "provider called more times than scripted");
            pages.remove(0)
        }

        async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
            self.details
                .iter()
                .find(|(id, _)| id == place_id)
                .map(|(_, d)| d.clone())
                .ok_or_else(|| PlacesError::Search {
                    status: "NOT_FOUND".to_owned(),
                })
        }
    }

    fn osu_circle() -> Geofence {
        Geofence::circle("Osu", Point { lat: 5.60, lng: -0.19 }, 500.0)
    }

    /// A point roughly `meters` north of the Osu circle center.
    fn north_of_center(meters: f64) -> Point {
        Point {
            lat: 5.60 + (meters / 6_371_000.0).to_degrees(),
            lng: -0.19,
        }
    }

    fn raw_at(id: &str, location: Point) -> RawPlace {
        RawPlace {
            place_id: Some(id.to_owned()),
            name: Some(format!("Place {id}")),
            vicinity: Some("Osu".to_owned()),
            formatted_address: None,
            geometry: Some(RawGeometry {
                location: Some(RawLatLng {
                    lat: location.lat,
                    lng: location.lng,
                }),
            }),
        }
    }

    fn single_page(places: Vec<RawPlace>) -> Result<SearchPage, PlacesError> {
        Ok(SearchPage {
            results: places,
            next_page_token: None,
        })
    }

    fn fast_policy() -> DiscoveryPolicy {
        DiscoveryPolicy {
            search: SearchPolicy {
                page_delay_ms: 0,
                max_retries: 3,
                backoff_base_ms: 0,
                max_radius_m: 50_000.0,
            },
            inter_pass_delay_ms: 0,
        }
    }

    fn terms(text_queries: &[&str]) -> SearchTerms {
        SearchTerms {
            nearby_type: "restaurant".to_owned(),
            text_queries: text_queries.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[tokio::test]
    async fn single_pass_drops_the_out_of_range_result() {
        let provider = PassProvider::new(vec![single_page(vec![
            raw_at("a", north_of_center(100.0)),
            raw_at("b", north_of_center(300.0)),
            raw_at("c", north_of_center(700.0)),
        ])]);

        let found = discover_places(&provider, &osu_circle(), &terms(&[]), &fast_policy(), |_| {})
            .await
            .unwrap();

        let ids: Vec<&str> = found.iter().map(|c| c.external_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"], "the 700 m candidate is outside the 500 m circle");
    }

    #[tokio::test]
    async fn overlapping_passes_dedupe_to_the_union() {
        let provider = PassProvider::new(vec![
            single_page(vec![
                raw_at("shared", north_of_center(50.0)),
                raw_at("nearby-only", north_of_center(120.0)),
            ]),
            single_page(vec![
                raw_at("shared", north_of_center(50.0)),
                raw_at("text-only", north_of_center(200.0)),
            ]),
        ]);

        let found = discover_places(
            &provider,
            &osu_circle(),
            &terms(&["cafe"]),
            &fast_policy(),
            |_| {},
        )
        .await
        .unwrap();

        let ids: Vec<&str> = found.iter().map(|c| c.external_id.as_str()).collect();
        assert_eq!(ids, vec!["shared", "nearby-only", "text-only"]);
    }

    #[tokio::test]
    async fn passes_run_in_order_with_the_resolved_area() {
        let provider = PassProvider::new(vec![
            single_page(vec![]),
            single_page(vec![]),
            single_page(vec![]),
        ]);

        discover_places(
            &provider,
            &osu_circle(),
            &terms(&["cafe", "bar"]),
            &fast_policy(),
            |_| {},
        )
        .await
        .unwrap();

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        assert!(matches!(
            &requests[0].kind,
            SearchKind::Nearby { place_type } if place_type == "restaurant"
        ));
        assert!(matches!(
            &requests[1].kind,
            SearchKind::Text { query } if query == "cafe"
        ));
        assert!(matches!(
            &requests[2].kind,
            SearchKind::Text { query } if query == "bar"
        ));
        for request in requests.iter() {
            assert!((request.radius_m - 500.0).abs() < f64::EPSILON);
            assert!(request.page_token.is_none());
        }
    }

    #[tokio::test]
    async fn progress_fires_after_every_pass() {
        let provider = PassProvider::new(vec![
            single_page(vec![raw_at("a", north_of_center(10.0))]),
            single_page(vec![raw_at("b", north_of_center(20.0))]),
        ]);

        let mut snapshots = Vec::new();
        discover_places(
            &provider,
            &osu_circle(),
            &terms(&["cafe"]),
            &fast_policy(),
            |p| snapshots.push(p),
        )
        .await
        .unwrap();

        assert_eq!(
            snapshots,
            vec![
                DiscoveryProgress {
                    candidates_so_far: 1,
                    passes_completed: 1,
                    passes_total: 2
                },
                DiscoveryProgress {
                    candidates_so_far: 2,
                    passes_completed: 2,
                    passes_total: 2
                },
            ]
        );
    }

    #[tokio::test]
    async fn a_failing_pass_aborts_the_run() {
        let provider = PassProvider::new(vec![
            single_page(vec![raw_at("a", north_of_center(10.0))]),
            Err(PlacesError::Search {
                status: "OVER_QUERY_LIMIT".to_owned(),
            }),
        ]);

        let mut progress_calls = 0;
        let result = discover_places(
            &provider,
            &osu_circle(),
            &terms(&["cafe", "bar"]),
            &fast_policy(),
            |_| progress_calls += 1,
        )
        .await;

        assert!(matches!(result, Err(PlacesError::Search { .. })));
        assert_eq!(progress_calls, 1, "only the completed pass reported progress");
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 2, "the third pass never ran");
    }

    #[tokio::test]
    async fn invalid_geofence_fails_before_any_search() {
        let provider = PassProvider::new(vec![]);
        let mut fence = osu_circle();
        fence.radius_m = None;

        let result =
            discover_places(&provider, &fence, &terms(&[]), &fast_policy(), |_| {}).await;

        assert!(matches!(result, Err(PlacesError::InvalidGeofence { .. })));
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn details_enrich_survivors_and_failures_keep_bare_candidates() {
        let provider = PassProvider::new(vec![single_page(vec![
            raw_at("rich", north_of_center(10.0)),
            raw_at("bare", north_of_center(20.0)),
        ])])
        .with_details("rich", "https://rich.example");

        let found = discover_places(&provider, &osu_circle(), &terms(&[]), &fast_policy(), |_| {})
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].website.as_deref(), Some("https://rich.example"));
        assert_eq!(found[0].phone_number.as_deref(), Some("+233 30 000 0000"));
        assert!(found[1].website.is_none(), "details failure keeps the candidate");
    }
}
