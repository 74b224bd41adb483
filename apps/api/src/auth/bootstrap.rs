use axum::Json;
use axum::extract::{Extension, State};
use lectern_application::{CallerContext, RegisterIdentityInput};
use lectern_core::AppError;
use tower_sessions::Session;

use crate::dto::{BootstrapRequest, SessionResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};

/// Signs in through the development bootstrap token.
///
/// Registers the identity on first use and binds the session cookie to it.
pub async fn bootstrap_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    session: Session,
    Json(payload): Json<BootstrapRequest>,
) -> ApiResult<Json<SessionResponse>> {
    if payload.token != state.bootstrap_token {
        return Err(AppError::Unauthorized("invalid bootstrap token".to_owned()).into());
    }

    let account = state
        .user_service
        .register_identity(
            caller.session.as_ref(),
            RegisterIdentityInput {
                email: payload.email,
                name: payload.name,
                image: payload.image,
                roles: Vec::new(),
            },
        )
        .await?;

    let identity = state
        .user_service
        .find_identity(account.id.as_str())
        .await?
        .ok_or_else(|| AppError::Unauthorized("account is blocked".to_owned()))?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, account.id.as_str())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    let resolved = state.session_resolver.resolve(identity).await;
    tracing::info!(user_id = %account.id, "bootstrap sign-in");

    Ok(Json(SessionResponse::from(&resolved)))
}
