use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use super::views;
use crate::{
    analysis::AnalysisError,
    auth::AuthError,
    control::CommandError,
    i18n::{Locale, Msg},
    sensors::TelemetryError,
};

/// Failures of the browser-facing routes. Validation problems do not appear
/// here: handlers re-render their form with a message instead.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("not logged in")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let locale = Locale::default();
        let (status, msg) = match &self {
            WebError::Unauthenticated => return Redirect::to("/login").into_response(),
            WebError::Forbidden => (StatusCode::FORBIDDEN, Msg::Forbidden),
            WebError::NotFound => (StatusCode::NOT_FOUND, Msg::NotFound),
            WebError::BadRequest(_) => (StatusCode::BAD_REQUEST, Msg::MissingField),
            WebError::Storage(_) | WebError::Internal(_) => {
                error!(error = %self, "Web request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Msg::ServerError)
            }
        };
        (status, views::error_page(locale, msg)).into_response()
    }
}

impl From<CommandError> for WebError {
    fn from(e: CommandError) -> Self {
        match e {
            CommandError::GreenhouseNotFound | CommandError::CommandNotFound => WebError::NotFound,
            CommandError::Forbidden => WebError::Forbidden,
            CommandError::MissingField => WebError::BadRequest(e.to_string()),
            CommandError::Storage(e) => WebError::Storage(e),
        }
    }
}

impl From<TelemetryError> for WebError {
    fn from(e: TelemetryError) -> Self {
        match e {
            TelemetryError::GreenhouseNotFound(_) => WebError::NotFound,
            TelemetryError::Storage(e) => WebError::Storage(e),
        }
    }
}

impl From<AuthError> for WebError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Storage(e) => WebError::Storage(e),
            other => WebError::Internal(other.into()),
        }
    }
}

impl From<AnalysisError> for WebError {
    fn from(e: AnalysisError) -> Self {
        match e {
            AnalysisError::EmptyImage | AnalysisError::InvalidBase64(_) => {
                WebError::BadRequest(e.to_string())
            }
            AnalysisError::Storage(io) => WebError::Internal(io.into()),
        }
    }
}
