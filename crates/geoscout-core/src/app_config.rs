#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub backend_base_url: String,
    pub google_maps_api_key: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Wait before requesting a token-bearing results page; provider page
    /// tokens take a moment to activate after being issued.
    pub places_page_delay_ms: u64,
    pub places_max_retries: u32,
    pub places_retry_backoff_base_ms: u64,
    pub places_inter_pass_delay_ms: u64,
    /// Largest search radius the places provider accepts.
    pub places_max_radius_m: f64,
    pub backend_max_retries: u32,
    pub backend_retry_base_delay_ms: u64,
    pub backend_inter_save_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("backend_base_url", &self.backend_base_url)
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("places_page_delay_ms", &self.places_page_delay_ms)
            .field("places_max_retries", &self.places_max_retries)
            .field(
                "places_retry_backoff_base_ms",
                &self.places_retry_backoff_base_ms,
            )
            .field(
                "places_inter_pass_delay_ms",
                &self.places_inter_pass_delay_ms,
            )
            .field("places_max_radius_m", &self.places_max_radius_m)
            .field("backend_max_retries", &self.backend_max_retries)
            .field(
                "backend_retry_base_delay_ms",
                &self.backend_retry_base_delay_ms,
            )
            .field(
                "backend_inter_save_delay_ms",
                &self.backend_inter_save_delay_ms,
            )
            .finish()
    }
}
