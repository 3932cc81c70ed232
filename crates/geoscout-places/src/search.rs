//! Paginated search runner.
//!
//! Drives repeated calls against a [`PlaceSearchProvider`], following page
//! tokens until the provider stops returning them. Tokens take a moment to
//! activate after being issued, so the runner waits a fixed delay before
//! each token-bearing page and retries the "not ready yet" race with a
//! bounded linear backoff. Any other failure is fatal for the call.

use std::time::Duration;

use geoscout_core::PlaceCandidate;

use crate::error::PlacesError;
use crate::provider::{PlaceSearchProvider, RawPlace, SearchPage, SearchRequest};

/// Pacing and retry policy for a multi-page search.
#[derive(Debug, Clone, Copy)]
pub struct SearchPolicy {
    /// Fixed wait before requesting a token-bearing page.
    pub page_delay_ms: u64,
    /// Additional attempts for a page whose token is not yet active.
    pub max_retries: u32,
    /// Linear backoff base: retry `n` sleeps `backoff_base_ms * n`.
    pub backoff_base_ms: u64,
    /// Largest search radius the provider accepts; larger requests are
    /// capped, not rejected.
    pub max_radius_m: f64,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            page_delay_ms: 2_000,
            max_retries: 3,
            backoff_base_ms: 2_000,
            max_radius_m: 50_000.0,
        }
    }
}

/// Runs one search to exhaustion across all of its pages.
///
/// Results preserve encounter order across pages and are never truncated
/// beyond what the provider itself returns. The caller combines multiple
/// runs (one per search term).
///
/// # Errors
///
/// - [`PlacesError::PaginationNotReady`] once a page exhausts its retries.
/// - Any other provider error, propagated from the failing page immediately.
pub async fn run_search<P>(
    provider: &P,
    request: &SearchRequest,
    policy: &SearchPolicy,
) -> Result<Vec<PlaceCandidate>, PlacesError>
where
    P: PlaceSearchProvider + ?Sized,
{
    let mut candidates: Vec<PlaceCandidate> = Vec::new();

    let mut page_request = request.clone();
    page_request.radius_m = request.radius_m.min(policy.max_radius_m);
    page_request.page_token = None;

    loop {
        let page = fetch_page_with_retry(provider, &page_request, policy).await?;
        let page_was_empty = page.results.is_empty();

        tracing::debug!(
            page_results = page.results.len(),
            total = candidates.len() + page.results.len(),
            has_next = page.next_page_token.is_some(),
            "search page complete"
        );

        candidates.extend(page.results.into_iter().map(RawPlace::into_candidate));

        match page.next_page_token {
            Some(token) if !page_was_empty => {
                if policy.page_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(policy.page_delay_ms)).await;
                }
                page_request.page_token = Some(token);
            }
            _ => break,
        }
    }

    Ok(candidates)
}

/// Fetches a single page, retrying only the token-activation race.
async fn fetch_page_with_retry<P>(
    provider: &P,
    request: &SearchRequest,
    policy: &SearchPolicy,
) -> Result<SearchPage, PlacesError>
where
    P: PlaceSearchProvider + ?Sized,
{
    let mut attempt = 0u32;
    loop {
        match provider.search(request).await {
            Ok(page) => return Ok(page),
            Err(PlacesError::PaginationNotReady { context }) => {
                attempt += 1;
                if attempt > policy.max_retries {
                    return Err(PlacesError::PaginationNotReady { context });
                }
                let delay_ms = policy.backoff_base_ms.saturating_mul(u64::from(attempt));
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    context = %context,
                    "page token not ready — retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
