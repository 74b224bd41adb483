use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use lectern_domain::UserSession;

use crate::dto::{
    SearchQuery, UpdateProfileRequest, UserFilterQuery, UserPageResponse, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn user_by_id_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let account = state.user_service.user_by_id(&user, user_id.as_str()).await?;

    Ok(Json(UserResponse::from(account)))
}

pub async fn users_by_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Path(role): Path<String>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let accounts = state
        .user_service
        .users_by_role(&user, role.as_str())
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(accounts))
}

pub async fn search_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<UserPageResponse>> {
    let page = state
        .user_service
        .search_users(&user, query.q.as_str(), query.limit, query.skip)
        .await?;

    Ok(Json(UserPageResponse::from(page)))
}

pub async fn filter_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Query(query): Query<UserFilterQuery>,
) -> ApiResult<Json<UserPageResponse>> {
    let page = state
        .user_service
        .filter_users(&user, query.filter()?, query.limit, query.skip)
        .await?;

    Ok(Json(UserPageResponse::from(page)))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let account = state
        .user_service
        .update_profile(&user, user_id.as_str(), payload.into())
        .await?;

    Ok(Json(UserResponse::from(account)))
}
