use axum::extract::{Extension, Path, Query, State};
use lectern_application::CallerContext;

use super::parse_kind;
use crate::dto::{ContentResponse, RevalidateQuery};
use crate::error::ApiResult;
use crate::reply::ServiceReply;
use crate::state::AppState;

pub async fn view_content_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, slug)): Path<(String, String)>,
    Query(query): Query<RevalidateQuery>,
) -> ApiResult<ServiceReply<ContentResponse>> {
    let kind = parse_kind(kind.as_str())?;
    let response = state
        .engagement_service
        .view(kind, slug.as_str(), &caller, query.revalidate.as_deref())
        .await;

    Ok(ServiceReply(response.map(ContentResponse::from)))
}

pub async fn like_content_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, content_id)): Path<(String, String)>,
    Query(query): Query<RevalidateQuery>,
) -> ApiResult<ServiceReply<bool>> {
    let kind = parse_kind(kind.as_str())?;
    let response = state
        .engagement_service
        .like(kind, content_id.as_str(), &caller, query.revalidate.as_deref())
        .await;

    Ok(ServiceReply(response))
}

pub async fn unlike_content_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, content_id)): Path<(String, String)>,
    Query(query): Query<RevalidateQuery>,
) -> ApiResult<ServiceReply<bool>> {
    let kind = parse_kind(kind.as_str())?;
    let response = state
        .engagement_service
        .unlike(kind, content_id.as_str(), &caller, query.revalidate.as_deref())
        .await;

    Ok(ServiceReply(response))
}

pub async fn save_content_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, content_id)): Path<(String, String)>,
    Query(query): Query<RevalidateQuery>,
) -> ApiResult<ServiceReply<bool>> {
    let kind = parse_kind(kind.as_str())?;
    let response = state
        .engagement_service
        .save(kind, content_id.as_str(), &caller, query.revalidate.as_deref())
        .await;

    Ok(ServiceReply(response))
}

pub async fn unsave_content_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, content_id)): Path<(String, String)>,
    Query(query): Query<RevalidateQuery>,
) -> ApiResult<ServiceReply<bool>> {
    let kind = parse_kind(kind.as_str())?;
    let response = state
        .engagement_service
        .unsave(kind, content_id.as_str(), &caller, query.revalidate.as_deref())
        .await;

    Ok(ServiceReply(response))
}
