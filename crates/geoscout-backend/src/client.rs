//! HTTP client for the backend-as-a-service persistence API.
//!
//! Wraps `reqwest` with typed CRUD calls over the `/geofences` and `/places`
//! resources. Reads are issued once; writes go through a bounded linear-
//! backoff retry because the hosted backend occasionally drops or 5xxes
//! individual requests under load. The bulk save loop is deliberately
//! sequential with a fixed delay between places, matching the rate-limit
//! expectations of the hosted service.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use geoscout_core::{Geofence, Place, PlaceCandidate};

use crate::error::BackendError;
use crate::retry::retry_with_backoff;

const GEOFENCES: &str = "geofences";
const PLACES: &str = "places";

/// Retry and pacing knobs for write operations.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure of a write.
    pub max_retries: u32,
    /// Linear backoff base: retry `n` sleeps `base_delay_ms * n`.
    pub base_delay_ms: u64,
    /// Fixed wait between consecutive places in a bulk save.
    pub inter_save_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            inter_save_delay_ms: 500,
        }
    }
}

/// Progress snapshot reported after each place in a bulk save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveProgress {
    /// Places attempted so far, successful or not.
    pub processed: usize,
    pub saved: usize,
    pub failed: usize,
    pub total: usize,
}

/// Client for the backend persistence API.
///
/// Use [`BackendClient::new`] with the configured base URL; tests point it
/// at a wiremock server instead.
pub struct BackendClient {
    client: Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl BackendClient {
    /// Creates a new client for the given backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`BackendError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let parsed =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| BackendError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;
        if parsed.cannot_be_a_base() {
            return Err(BackendError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot serve as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            retry: RetryPolicy::default(),
        })
    }

    /// Overrides the default write retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    // -----------------------------------------------------------------------
    // Geofences
    // -----------------------------------------------------------------------

    /// Lists all geofences.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_geofences(&self) -> Result<Vec<Geofence>, BackendError> {
        let url = self.endpoint(&[GEOFENCES]);
        let body = self.request_json(self.client.get(url)).await?;
        parse(body, "get_geofences")
    }

    /// Saves a new geofence; the backend assigns and returns the `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn save_geofence(&self, geofence: &Geofence) -> Result<Geofence, BackendError> {
        let url = self.endpoint(&[GEOFENCES]);
        let body = self
            .request_json(self.client.post(url).json(geofence))
            .await?;
        parse(body, "save_geofence")
    }

    /// Updates an existing geofence (rename is the only supported edit once
    /// coordinates are saved).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn update_geofence(
        &self,
        geofence_id: &str,
        geofence: &Geofence,
    ) -> Result<Geofence, BackendError> {
        let url = self.endpoint(&[GEOFENCES, geofence_id]);
        let body = self
            .request_json(self.client.put(url).json(geofence))
            .await?;
        parse(body, "update_geofence")
    }

    /// Deletes a geofence by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure or a non-2xx status.
    pub async fn delete_geofence(&self, geofence_id: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&[GEOFENCES, geofence_id]);
        self.request_no_content(self.client.delete(url)).await
    }

    // -----------------------------------------------------------------------
    // Places
    // -----------------------------------------------------------------------

    /// Lists the places saved inside a geofence.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn places_in_geofence(&self, geofence_id: &str) -> Result<Vec<Place>, BackendError> {
        let mut url = self.endpoint(&[PLACES]);
        url.query_pairs_mut().append_pair("geofence_id", geofence_id);
        let body = self.request_json(self.client.get(url)).await?;
        parse(body, "places_in_geofence")
    }

    /// Fetches a single place by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure, a non-2xx status, or an
    /// unexpected response shape.
    pub async fn get_place(&self, place_id: &str) -> Result<Place, BackendError> {
        let url = self.endpoint(&[PLACES, place_id]);
        let body = self.request_json(self.client.get(url)).await?;
        parse(body, "get_place")
    }

    /// Saves a single place, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the final [`BackendError`] once the retry budget is spent.
    pub async fn save_place(&self, place: &Place) -> Result<Place, BackendError> {
        retry_with_backoff(self.retry.max_retries, self.retry.base_delay_ms, || {
            let place = place.clone();
            async move {
                let url = self.endpoint(&[PLACES]);
                let body = self.request_json(self.client.post(url).json(&place)).await?;
                parse(body, "save_place")
            }
        })
        .await
    }

    /// Updates a place (visited toggle, notes, contact fields), retrying
    /// transient failures.
    ///
    /// # Errors
    ///
    /// Returns the final [`BackendError`] once the retry budget is spent.
    pub async fn update_place(&self, place: &Place) -> Result<Place, BackendError> {
        let place_id = place.id.clone().unwrap_or_default();
        retry_with_backoff(self.retry.max_retries, self.retry.base_delay_ms, || {
            let place = place.clone();
            let place_id = place_id.clone();
            async move {
                let url = self.endpoint(&[PLACES, &place_id]);
                let body = self.request_json(self.client.put(url).json(&place)).await?;
                parse(body, "update_place")
            }
        })
        .await
    }

    /// Deletes a place by id.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on network failure or a non-2xx status.
    pub async fn delete_place(&self, place_id: &str) -> Result<(), BackendError> {
        let url = self.endpoint(&[PLACES, place_id]);
        self.request_no_content(self.client.delete(url)).await
    }

    /// Persists accepted candidates for a geofence, one at a time.
    ///
    /// Each place gets its own retry budget; a place that exhausts it is
    /// logged and skipped so one bad record cannot sink the rest of the run.
    /// `on_progress` fires after every attempted place. Returns the places
    /// the backend actually accepted, in save order.
    pub async fn save_places<F>(
        &self,
        geofence_id: &str,
        candidates: &[PlaceCandidate],
        mut on_progress: F,
    ) -> Vec<Place>
    where
        F: FnMut(SaveProgress),
    {
        let total = candidates.len();
        let mut saved_places: Vec<Place> = Vec::new();
        let mut failed = 0usize;

        for (index, candidate) in candidates.iter().enumerate() {
            if index > 0 && self.retry.inter_save_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.retry.inter_save_delay_ms)).await;
            }

            let place = Place::from_candidate(geofence_id, candidate.clone());
            match self.save_place(&place).await {
                Ok(saved) => saved_places.push(saved),
                Err(err) => {
                    failed += 1;
                    tracing::warn!(
                        name = %place.name,
                        external_id = %place.external_id,
                        error = %err,
                        "failed to save place — continuing with the rest"
                    );
                }
            }

            on_progress(SaveProgress {
                processed: index + 1,
                saved: saved_places.len(),
                failed,
                total,
            });
        }

        tracing::info!(saved = saved_places.len(), failed, total, "place save run complete");
        saved_places
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    /// Builds a resource URL by appending path segments to the base.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // http(s) URLs always have a segmented path; the constructor rejects
        // cannot-be-a-base URLs.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    /// Sends the request, asserts a 2xx status, and parses the body as JSON.
    async fn request_json(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
            context: url,
            source: e,
        })
    }

    /// Sends the request and asserts a 2xx status, ignoring any body.
    async fn request_no_content(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(), BackendError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(())
    }
}

/// Deserializes a checked JSON body into the expected type.
fn parse<T: DeserializeOwned>(body: serde_json::Value, context: &str) -> Result<T, BackendError> {
    serde_json::from_value(body).map_err(|e| BackendError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
