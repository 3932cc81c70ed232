use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlacesError {
    /// Malformed geofence input. Local validation, never retried.
    #[error("invalid geofence: {reason}")]
    InvalidGeofence { reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider's next-page token is not yet active. Retried with a
    /// bounded linear backoff by the search runner.
    #[error("pagination token not ready for {context}")]
    PaginationNotReady { context: String },

    /// Any other non-OK, non-zero-results provider status. Fatal for the
    /// call; never retried.
    #[error("place search failed with provider status {status}")]
    Search { status: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid provider base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
