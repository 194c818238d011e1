use actix_web::http::StatusCode;
use thiserror::Error;
use crate::google_places::PlacesStatus;

/// Failures talking to an upstream collaborator.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("Gemini API error: {0}")]
    Gemini(String),

    #[error("Gemini returned no text")]
    EmptyCompletion,
}

// Request URLs carry the API key as a query parameter, so they are dropped
// before the error can reach a response body or a log line.
impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.without_url())
    }
}

/// Request-level failures, each mapped to the status code the handler
/// answers with.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("API keys are missing, please enter them in settings")]
    MissingCredentials,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Google API error: {0}")]
    Upstream(PlacesStatus),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingApiKey => StatusCode::BAD_REQUEST,
            AppError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Upstream(_) | AppError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Collaborator failures are replaced by
    /// the handler's generic busy text.
    pub fn user_message(&self, busy: &str) -> String {
        match self {
            AppError::Client(_) => busy.to_string(),
            other => other.to_string(),
        }
    }
}
