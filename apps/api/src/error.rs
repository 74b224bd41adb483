use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lectern_core::AppError;
use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self.0 {
            tracing::error!(error = %detail, "request failed with internal fault");
        }

        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let payload = Json(ErrorResponse {
            message: self.0.public_message(),
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use lectern_core::AppError;

    use super::ApiError;

    #[test]
    fn business_rejections_share_unauthorized_status() {
        for error in [
            AppError::Unauthorized("no".to_owned()),
            AppError::NotPublished("draft".to_owned()),
            AppError::AlreadyDone("liked".to_owned()),
            AppError::NotDone("not liked".to_owned()),
        ] {
            assert_eq!(
                ApiError(error).into_response().status(),
                StatusCode::UNAUTHORIZED
            );
        }
    }

    #[test]
    fn internal_faults_map_to_server_error() {
        let response = ApiError(AppError::Internal("pool closed".to_owned())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
