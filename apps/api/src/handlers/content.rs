use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use lectern_application::CallerContext;
use lectern_domain::ContentKind;

use crate::dto::{ContentPageResponse, ContentResponse, SearchQuery, TopContentQuery};
use crate::error::ApiResult;
use crate::state::AppState;

mod engagement;

pub use engagement::{
    like_content_handler, save_content_handler, unlike_content_handler, unsave_content_handler,
    view_content_handler,
};

pub(crate) fn parse_kind(value: &str) -> ApiResult<ContentKind> {
    Ok(ContentKind::from_str(value)?)
}

pub async fn top_content_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(kind): Path<String>,
    Query(query): Query<TopContentQuery>,
) -> ApiResult<Json<ContentPageResponse>> {
    let kind = parse_kind(kind.as_str())?;
    let page = state
        .content_service
        .top_content(
            kind,
            query.order()?,
            query.limit,
            query.skip,
            caller.session.as_ref(),
        )
        .await?;

    Ok(Json(ContentPageResponse::from(page)))
}

pub async fn search_content_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path(kind): Path<String>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<ContentPageResponse>> {
    let kind = parse_kind(kind.as_str())?;
    let page = state
        .content_service
        .search_content(
            kind,
            query.q.as_str(),
            query.limit,
            query.skip,
            caller.session.as_ref(),
        )
        .await?;

    Ok(Json(ContentPageResponse::from(page)))
}

pub async fn content_by_author_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, author_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<ContentResponse>>> {
    let kind = parse_kind(kind.as_str())?;
    let documents = state
        .content_service
        .content_by_author(kind, author_id.as_str(), caller.session.as_ref())
        .await?
        .into_iter()
        .map(ContentResponse::from)
        .collect();

    Ok(Json(documents))
}

pub async fn content_by_id_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, content_id)): Path<(String, String)>,
) -> ApiResult<Json<ContentResponse>> {
    let kind = parse_kind(kind.as_str())?;
    let document = state
        .content_service
        .content_by_id(kind, content_id.as_str(), caller.session.as_ref())
        .await?;

    Ok(Json(ContentResponse::from(document)))
}

pub async fn content_by_slug_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerContext>,
    Path((kind, slug)): Path<(String, String)>,
) -> ApiResult<Json<ContentResponse>> {
    let kind = parse_kind(kind.as_str())?;
    let document = state
        .content_service
        .content_by_slug(kind, slug.as_str(), caller.session.as_ref())
        .await?;

    Ok(Json(ContentResponse::from(document)))
}
