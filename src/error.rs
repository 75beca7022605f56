//! Error types for the application

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Naming enrichment error: {0}")]
    Enrichment(String),

    #[error("Extraction superseded by a newer run for session {0}")]
    Superseded(String),

    #[error("Extraction task failed: {0}")]
    Task(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidSettings(_) => StatusCode::BAD_REQUEST,
            AppError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Superseded(_) => StatusCode::CONFLICT,
            AppError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Enrichment(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
        };

        (status, self.to_string()).into_response()
    }
}
