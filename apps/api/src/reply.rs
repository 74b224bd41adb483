use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lectern_core::ServiceResponse;
use serde::Serialize;

/// Renders a tagged service result with the status code it carries.
#[derive(Debug)]
pub struct ServiceReply<T>(pub ServiceResponse<T>);

impl<T> From<ServiceResponse<T>> for ServiceReply<T> {
    fn from(value: ServiceResponse<T>) -> Self {
        Self(value)
    }
}

impl<T: Serialize> IntoResponse for ServiceReply<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.0)).into_response()
    }
}
