//! HTTP client for the Google Places web service.
//!
//! Implements [`PlaceSearchProvider`] over the JSON endpoints
//! (`nearbysearch`, `textsearch`, `details`). Every response carries a
//! `"status"` field in the envelope; `INVALID_REQUEST` while a page token is
//! in flight is the provider's token-activation race and is surfaced as
//! [`PlacesError::PaginationNotReady`] so the runner can retry it.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::PlacesError;
use crate::provider::{PlaceDetails, PlaceSearchProvider, RawPlace, SearchKind, SearchPage, SearchRequest};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
const DETAILS_FIELDS: &str = "website,formatted_phone_number";

/// Client for the Google Places web service.
///
/// Use [`GooglePlacesClient::new`] for production or
/// [`GooglePlacesClient::with_base_url`] to point at a mock server in tests.
pub struct GooglePlacesClient {
    client: Client,
    api_key: String,
    nearby_url: Url,
    text_url: Url,
    details_url: Url,
}

impl GooglePlacesClient {
    /// Creates a new client pointed at the production Places endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Normalise: the base must end with a slash so endpoint joins append
        // rather than replace the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let endpoint = |path: &str| -> Result<Url, PlacesError> {
            base.join(path).map_err(|e| PlacesError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })
        };

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            nearby_url: endpoint("place/nearbysearch/json")?,
            text_url: endpoint("place/textsearch/json")?,
            details_url: endpoint("place/details/json")?,
        })
    }

    /// Builds the full search URL with percent-encoded query parameters.
    fn build_search_url(&self, request: &SearchRequest) -> Url {
        let mut url = match request.kind {
            SearchKind::Nearby { .. } => self.nearby_url.clone(),
            SearchKind::Text { .. } => self.text_url.clone(),
        };
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair(
                "location",
                &format!("{},{}", request.location.lat, request.location.lng),
            );
            pairs.append_pair("radius", &format!("{:.0}", request.radius_m));
            match &request.kind {
                SearchKind::Nearby { place_type } => {
                    pairs.append_pair("type", place_type);
                }
                SearchKind::Text { query } => {
                    pairs.append_pair("query", query);
                }
            }
            if let Some(token) = &request.page_token {
                pairs.append_pair("pagetoken", token);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body
    /// as JSON.
    async fn request_json(&self, url: Url) -> Result<serde_json::Value, PlacesError> {
        let context = redact_key(&url);
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize { context, source: e })
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsEnvelope {
    status: String,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

/// Maps a search envelope status onto a page or a typed error.
///
/// `INVALID_REQUEST` only means "token not ready" when a token was actually
/// sent; without one it is a genuinely malformed request and stays fatal.
fn page_from_envelope(
    envelope: SearchEnvelope,
    token_in_flight: bool,
    context: &str,
) -> Result<SearchPage, PlacesError> {
    match envelope.status.as_str() {
        "OK" => Ok(SearchPage {
            results: envelope.results,
            next_page_token: envelope.next_page_token,
        }),
        "ZERO_RESULTS" => Ok(SearchPage::default()),
        "INVALID_REQUEST" if token_in_flight => Err(PlacesError::PaginationNotReady {
            context: context.to_owned(),
        }),
        other => Err(PlacesError::Search {
            status: other.to_owned(),
        }),
    }
}

fn describe_kind(kind: &SearchKind) -> String {
    match kind {
        SearchKind::Nearby { place_type } => format!("nearby({place_type})"),
        SearchKind::Text { query } => format!("text({query})"),
    }
}

/// Strips query parameters (including the API key) from a URL for error
/// context.
fn redact_key(url: &Url) -> String {
    let mut stripped = url.clone();
    stripped.set_query(None);
    stripped.to_string()
}

#[async_trait::async_trait]
impl PlaceSearchProvider for GooglePlacesClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, PlacesError> {
        let token_in_flight = request.page_token.is_some();
        let context = describe_kind(&request.kind);
        let url = self.build_search_url(request);

        tracing::debug!(
            kind = %context,
            token_in_flight,
            radius_m = request.radius_m,
            "issuing place search"
        );

        let body = self.request_json(url).await?;
        let envelope: SearchEnvelope =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: context.clone(),
                source: e,
            })?;

        page_from_envelope(envelope, token_in_flight, &context)
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let mut url = self.details_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("place_id", place_id);
            pairs.append_pair("fields", DETAILS_FIELDS);
        }

        let body = self.request_json(url).await?;
        let envelope: DetailsEnvelope =
            serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                context: format!("details({place_id})"),
                source: e,
            })?;

        match envelope.status.as_str() {
            "OK" => Ok(envelope.result.unwrap_or_default()),
            other => Err(PlacesError::Search {
                status: other.to_owned(),
            }),
        }
    }
}
