use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tinylink_core::ShortenerError;
use tinylink_redirector::RedirectorError;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

const INTERNAL_ERROR_DETAIL: &str = "Internal server error occurred";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("URL not found")]
    NotFound,
    #[error("stored url for '{0}' cannot be used as a redirect target")]
    UnusableTarget(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error(transparent)]
    Redirector(#[from] RedirectorError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidUrl(rejection.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::UnusableTarget(_) | AppError::Shortener(_) | AppError::Redirector(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side details stay in the logs.
        let detail = if status.is_server_error() {
            match &self {
                AppError::Shortener(ShortenerError::AllocationExhausted { .. }) => {
                    error!(error = %self, "short id allocation exhausted");
                }
                _ => error!(error = %self, "request failed"),
            }
            INTERNAL_ERROR_DETAIL.to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
