use thiserror::Error;

/// Failures surfaced by the search pipeline.
///
/// Every variant reaches the caller unchanged; nothing here is retried.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Caller supplied parameters that cannot form a valid query
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameters { field: String, reason: String },

    /// The geocoding service returned no match
    #[error("Could not geocode location: '{location}'")]
    GeocodeNotFound { location: String },

    /// Network, auth or protocol failure talking to the geocoding service
    #[error("Geocoding service error: {0}")]
    GeocodeServiceError(String),

    /// The search engine could not be reached or rejected our credentials
    #[error("Search engine unavailable: {0}")]
    SearchUnavailable(String),

    /// The search engine rejected the request itself
    #[error("Search execution failed: {0}")]
    SearchExecutionError(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConnectorError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConnectorError::InvalidParameters {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable tag used when relaying the failure to a client
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectorError::InvalidParameters { .. } => "InvalidParameters",
            ConnectorError::GeocodeNotFound { .. } => "GeocodeNotFound",
            ConnectorError::GeocodeServiceError(_) => "GeocodeServiceError",
            ConnectorError::SearchUnavailable(_) => "SearchUnavailable",
            ConnectorError::SearchExecutionError(_) => "SearchExecutionError",
            ConnectorError::Config(_) => "Config",
        }
    }

    /// Whether the user can fix this by rephrasing the request
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            ConnectorError::InvalidParameters { .. } | ConnectorError::GeocodeNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
