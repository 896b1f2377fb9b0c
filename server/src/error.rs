use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use boxoffice_core::ServiceError;
use serde_json::json;
use tracing::error;

pub const OVER_ALLOCATED_MESSAGE: &str = "quantity exceeds available allocation";
pub const INSUFFICIENT_TICKETS_MESSAGE: &str = "not enough tickets were generated";
pub const INTERNAL_MESSAGE: &str = "something went wrong";

/// Everything a handler can fail with, rendered as a JSON body with a `message` field.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be read as the expected JSON.
    BadRequest(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self { ApiError::Service(err) }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { ApiError::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "message": message })),
            ApiError::Service(ServiceError::Validation(message)) => (StatusCode::BAD_REQUEST, json!({ "message": message })),
            ApiError::Service(ServiceError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, json!({ "message": format!("ticket option {id} not found") }))
            }
            ApiError::Service(ServiceError::OverAllocated { requested }) => {
                (StatusCode::BAD_REQUEST, json!({ "quantity": requested, "message": OVER_ALLOCATED_MESSAGE }))
            }
            ApiError::Service(err @ ServiceError::InsufficientTicketsGenerated { .. }) => {
                error!("request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": INSUFFICIENT_TICKETS_MESSAGE }))
            }
            ApiError::Service(ServiceError::Internal(err)) => {
                // the cause stays in the log
                error!("request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": INTERNAL_MESSAGE }))
            }
        };

        (status, Json(body)).into_response()
    }
}
