use thiserror::Error;

/// Main error type for the odds client
#[derive(Error, Debug)]
pub enum OddsError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage error: {0}")]
    Storage(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Odds provider errors, as seen by consumers
    #[error(transparent)]
    Api(#[from] ApiError),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OddsError {
    /// The provider-facing classification, if this error carries one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            OddsError::Api(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type alias for OddsError
pub type Result<T> = std::result::Result<T, OddsError>;

/// Classified odds API failures.
///
/// Cloneable so a single in-flight request can hand the same outcome to every
/// caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("API key required: configure a provider key first")]
    KeyRequired,

    #[error("API key rejected by the odds provider")]
    KeyInvalid,

    #[error("Odds provider rate limit reached")]
    RateLimited,

    #[error("Sport disabled: {sport}")]
    SportDisabled { sport: String },

    #[error("Odds provider unreachable: {0}")]
    Connection(String),
}

impl ApiError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::KeyRequired => "API_KEY_REQUIRED",
            ApiError::KeyInvalid => "API_KEY_INVALID",
            ApiError::RateLimited => "API_RATE_LIMIT",
            ApiError::SportDisabled { .. } => "SPORT_DISABLED",
            ApiError::Connection(_) => "API_CONNECTION_ERROR",
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::KeyRequired => "The odds service is not configured yet.",
            ApiError::KeyInvalid => "The odds service credential was rejected.",
            ApiError::RateLimited => "Odds data may be outdated, the provider is throttling requests.",
            ApiError::SportDisabled { .. } => "Odds for this sport are unavailable.",
            ApiError::Connection(_) => "The odds service could not be reached.",
        }
    }

    /// Credential problems need operator action, not a retry.
    pub fn is_configuration_problem(&self) -> bool {
        matches!(self, ApiError::KeyRequired | ApiError::KeyInvalid)
    }

    /// Whether a polling consumer may reschedule the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::RateLimited | ApiError::Connection(_))
    }
}
