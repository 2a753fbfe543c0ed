use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use nw_core::Error;

/// Wraps pipeline errors for the HTTP surface, mapping each variant to
/// a status code and a structured body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Error::SourceNotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateUrl(_) => StatusCode::CONFLICT,
            Error::Scraping(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
