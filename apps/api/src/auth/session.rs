use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use lectern_application::CallerContext;
use lectern_core::AppError;
use lectern_domain::UserSession;
use tower_sessions::Session;

use crate::dto::SessionResponse;
use crate::error::ApiResult;

pub async fn me_handler(
    Extension(user): Extension<UserSession>,
) -> ApiResult<Json<SessionResponse>> {
    Ok(Json(SessionResponse::from(&user)))
}

/// Rotates the session id and returns freshly resolved permissions.
pub async fn refresh_handler(
    Extension(user): Extension<UserSession>,
    session: Session,
) -> ApiResult<Json<SessionResponse>> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    Ok(Json(SessionResponse::from(&user)))
}

pub async fn logout_handler(
    Extension(caller): Extension<CallerContext>,
    session: Session,
) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(user) = caller.session {
        tracing::info!(user_id = user.user_id(), "signed out");
    }

    Ok(StatusCode::NO_CONTENT)
}
