use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use lectern_application::CreateRoleInput;
use lectern_domain::{Permission, RoleStatus, UserSession};

use crate::dto::{CreateRoleRequest, PermissionResponse, RoleResponse, UpdateRoleStatusRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    let permissions = state
        .role_service
        .permission_catalog(&user)?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let roles = state
        .role_service
        .list_roles(&user)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let permissions = payload
        .permissions
        .iter()
        .map(|value| Permission::from_transport(value.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let role = state
        .role_service
        .create_role(
            &user,
            CreateRoleInput {
                name: payload.name,
                description: payload.description,
                rank: payload.rank,
                permissions,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn role_by_id_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.role_service.role_by_id(&user, role_id.as_str()).await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn role_by_name_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Path(name): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role = state.role_service.role_by_name(&user, name.as_str()).await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserSession>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleStatusRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let status = RoleStatus::from_str(payload.status.as_str())?;
    let role = state
        .role_service
        .set_role_status(&user, role_id.as_str(), status)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}
