use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Analysis service is rate limiting requests")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Model '{model_id}' is unavailable: {reason}")]
    ModelUnavailable { model_id: String, reason: String },

    #[error("Analysis service error ({code}): {message}")]
    Service { code: String, message: String },
}

impl AuditError {
    /// True for the retry-later condition; callers surface it to the user
    /// instead of treating it as a failure of the document.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AuditError::RateLimited { .. })
    }

    /// True for errors that must abort before any document is accepted.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AuditError::MissingConfig { .. } | AuditError::InvalidConfigValue { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
