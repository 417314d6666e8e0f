use markslip_core::MarkError;
use thiserror::Error;

/// Failures of a backend action, worded for the toast the user sees
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Backend URL not configured. Set MARKSLIP_BACKEND_URL to your Apps Script deployment URL.")]
    NotConfigured,

    #[error("Cannot connect to backend. Please check your Apps Script deployment URL and ensure CORS is enabled.")]
    Transport(String),

    #[error("Backend not found. Please check your Apps Script deployment URL.")]
    NotFound,

    #[error("Access denied. Please ensure your Apps Script is deployed with \"Anyone\" access.")]
    AccessDenied,

    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// The backend answered `success: false`
    #[error("{0}")]
    Backend(String),

    #[error("Unexpected response from backend: {0}")]
    Decode(String),

    #[error("Response is missing {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Invalid(#[from] MarkError),
}

impl ApiError {
    /// Map a non-2xx HTTP status
    pub fn from_status(status: u16) -> Self {
        match status {
            404 => ApiError::NotFound,
            403 => ApiError::AccessDenied,
            other => ApiError::Status(other),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotConfigured => "NOT_CONFIGURED",
            ApiError::Transport(_) => "TRANSPORT",
            ApiError::NotFound => "NOT_FOUND",
            ApiError::AccessDenied => "ACCESS_DENIED",
            ApiError::Status(_) => "HTTP_STATUS",
            ApiError::Backend(_) => "BACKEND",
            ApiError::Decode(_) => "DECODE",
            ApiError::MissingField(_) => "MISSING_FIELD",
            ApiError::Invalid(e) => e.code(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
