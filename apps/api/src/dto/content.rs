use lectern_application::{ContentOrder, ContentPage};
use lectern_core::AppError;
use lectern_domain::{ContentDocument, MemberRef};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::default_page_limit;

/// Optional path forwarded to the revalidation port after a mutation.
#[derive(Debug, Default, Deserialize)]
pub struct RevalidateQuery {
    pub revalidate: Option<String>,
}

/// Paging and ordering for the top content listing.
#[derive(Debug, Deserialize)]
pub struct TopContentQuery {
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default = "default_page_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

impl TopContentQuery {
    pub fn order(&self) -> Result<ContentOrder, AppError> {
        match self.order_by.as_deref() {
            None | Some("views") => Ok(ContentOrder::Views),
            Some("likes") => Ok(ContentOrder::Likes),
            Some("saves") => Ok(ContentOrder::Saves),
            Some(other) => Err(AppError::Validation(format!(
                "unknown order_by '{other}', expected views, likes or saves"
            ))),
        }
    }
}

/// Member reference stored in engagement lists.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/member-response.ts"
)]
pub struct MemberResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

impl From<MemberRef> for MemberResponse {
    fn from(value: MemberRef) -> Self {
        Self {
            id: value.id,
            email: value.email,
            name: value.name,
            image: value.image,
        }
    }
}

/// API representation of a blog, course or service document.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/content-response.ts"
)]
pub struct ContentResponse {
    pub id: String,
    pub kind: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author: MemberResponse,
    pub is_published: bool,
    pub views: u64,
    pub likes: u64,
    pub saves: u64,
    pub liked_by: Vec<MemberResponse>,
    pub saved_by: Vec<MemberResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ContentDocument> for ContentResponse {
    fn from(value: ContentDocument) -> Self {
        Self {
            id: value.id,
            kind: value.kind.as_str().to_owned(),
            slug: value.slug,
            title: value.title,
            excerpt: value.excerpt,
            body: value.body,
            tags: value.tags,
            author: MemberResponse::from(value.author),
            is_published: value.is_published,
            views: value.views,
            likes: value.likes,
            saves: value.saves,
            liked_by: value.liked_by.into_iter().map(MemberResponse::from).collect(),
            saved_by: value.saved_by.into_iter().map(MemberResponse::from).collect(),
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// One page of ranked or searched content.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/content-page-response.ts"
)]
pub struct ContentPageResponse {
    pub items: Vec<ContentResponse>,
    pub total: u64,
}

impl From<ContentPage> for ContentPageResponse {
    fn from(value: ContentPage) -> Self {
        Self {
            items: value.items.into_iter().map(ContentResponse::from).collect(),
            total: value.total,
        }
    }
}
