//! HTTP mapping for errors surfaced by the ops endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use folio_core::error::{ClientCode, FolioError};

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub FolioError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let status = match code {
            ClientCode::BadRequest | ClientCode::UnknownEvent | ClientCode::UnsupportedVersion => {
                StatusCode::BAD_REQUEST
            }
            ClientCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ClientCode::Internal => {
                tracing::error!(error = %self.0, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({
            "error": code.as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
