use std::str::FromStr;

use lectern_application::{UserFilter, UserPage};
use lectern_core::AppError;
use lectern_domain::{ProfilePatch, SavedContentRef, UserAccount, UserStatus};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::default_page_limit;

/// Incoming payload for profile edits; omitted fields stay unchanged.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/update-profile-request.ts"
)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl From<UpdateProfileRequest> for ProfilePatch {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            name: value.name,
            bio: value.bio,
            image: value.image,
        }
    }
}

/// Saved content entry on an account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/saved-content-response.ts"
)]
pub struct SavedContentResponse {
    pub reference: String,
    pub kind: String,
    pub created_at: String,
}

impl From<SavedContentRef> for SavedContentResponse {
    fn from(value: SavedContentRef) -> Self {
        Self {
            reference: value.reference,
            kind: value.kind.as_str().to_owned(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// API representation of an account.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub bio: Option<String>,
    pub roles: Vec<String>,
    pub status: String,
    pub saved_content: Vec<SavedContentResponse>,
}

impl From<UserAccount> for UserResponse {
    fn from(value: UserAccount) -> Self {
        Self {
            user_id: value.id,
            email: value.email,
            name: value.name,
            image: value.image,
            bio: value.bio,
            roles: value.roles,
            status: value.status.as_str().to_owned(),
            saved_content: value
                .saved_content
                .into_iter()
                .map(SavedContentResponse::from)
                .collect(),
        }
    }
}

/// Field filter and paging for the user filter listing.
#[derive(Debug, Deserialize)]
pub struct UserFilterQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_page_limit")]
    pub limit: usize,
    #[serde(default)]
    pub skip: usize,
}

impl UserFilterQuery {
    pub fn filter(&self) -> Result<UserFilter, AppError> {
        Ok(UserFilter {
            status: self.status.as_deref().map(UserStatus::from_str).transpose()?,
            role: self.role.clone(),
            email: self.email.clone(),
        })
    }
}

/// One page of accounts.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../../packages/api-types/src/generated/user-page-response.ts"
)]
pub struct UserPageResponse {
    pub items: Vec<UserResponse>,
    pub total: u64,
}

impl From<UserPage> for UserPageResponse {
    fn from(value: UserPage) -> Self {
        Self {
            items: value.items.into_iter().map(UserResponse::from).collect(),
            total: value.total,
        }
    }
}
