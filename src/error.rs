use askama::Template;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::template::{ErrorTemplate, SERVER_ERROR_MESSAGE};

/// Status code and client-facing message for a domain error.
fn classify(err: &mealdays_shared::Error) -> (StatusCode, String) {
    use mealdays_shared::Error;

    match err {
        Error::Validate(_) | Error::InvalidForm(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
        Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        Error::MalformedDay(_) | Error::Server(_) | Error::Unknown(_) => {
            tracing::error!("{err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                SERVER_ERROR_MESSAGE.to_owned(),
            )
        }
    }
}

/// Error page for HTML form posts.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct AppError(#[from] pub mealdays_shared::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = classify(&self.0);
        let title = match status {
            StatusCode::UNPROCESSABLE_ENTITY => "Changes not saved",
            StatusCode::NOT_FOUND => "Day not found",
            _ => "Server error",
        };

        let page = ErrorTemplate {
            status_code: status.as_u16(),
            title,
            message: &message,
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!("Failed to render error page: {err}");
                (status, message).into_response()
            }
        }
    }
}

/// JSON error body `{"message": ...}` for the API routes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error(transparent)]
    Domain(#[from] mealdays_shared::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unprocessable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            ApiError::Domain(err) => classify(&err),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_status() {
        let cases = [
            (
                mealdays_shared::Error::InvalidForm("missing day index 1".to_owned()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                mealdays_shared::Error::NotFound("day 9".to_owned()),
                StatusCode::NOT_FOUND,
            ),
            (
                mealdays_shared::Error::Server("boom".to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_server_errors_hide_details() {
        let (_, message) = classify(&mealdays_shared::Error::Server("db path leaked".to_owned()));
        assert_eq!(message, SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn test_api_bad_request() {
        let response = ApiError::BadRequest("expected day or days".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
