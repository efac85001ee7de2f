use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error {0}")]
    UpstreamStatus(u16),
    #[error("No 'fare' in API response.")]
    MissingFare,
    #[error("Malformed API response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Errors the form surfaces inline; everything else bubbles up as an
    /// HTTP error response.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Transport(_)
                | AppError::UpstreamStatus(_)
                | AppError::MissingFare
                | AppError::Malformed(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Config(_) | AppError::Io(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Transport(_)
            | AppError::UpstreamStatus(_)
            | AppError::MissingFare
            | AppError::Malformed(_) => StatusCode::BAD_GATEWAY,
        };

        (status, self.to_string()).into_response()
    }
}
