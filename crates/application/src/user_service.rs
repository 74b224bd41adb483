use std::sync::Arc;

use chrono::Utc;
use lectern_core::{AppError, AppResult, UserIdentity};
use lectern_domain::{
    EmailAddress, OPERATOR_ROLE_NAME, Permission, ProfilePatch, UserAccount, UserSession,
    UserStatus, normalize_roles,
};
use uuid::Uuid;

use crate::content_service::page_limit;
use crate::{
    OperatorAllowList, RegisterIdentityInput, UserFilter, UserPage, UserRepository,
    match_permissions, require_any_permission,
};

/// Account directory: registration, lookups and profile edits.
#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
    operator_allow_list: OperatorAllowList,
}

impl UserService {
    /// Creates a new user directory service.
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        operator_allow_list: OperatorAllowList,
    ) -> Self {
        Self {
            user_repository,
            operator_allow_list,
        }
    }

    /// Creates or refreshes an account on sign-in, keyed by email.
    ///
    /// New accounts start `active` when the actor holds `user_add`, otherwise
    /// `pending`. Existing accounts keep their id, status and roles.
    pub async fn register_identity(
        &self,
        actor: Option<&UserSession>,
        input: RegisterIdentityInput,
    ) -> AppResult<UserAccount> {
        let email = EmailAddress::new(input.email)?;
        let now = Utc::now();

        let existing = self
            .user_repository
            .find_user_by_email(email.as_str())
            .await?;
        let account = match existing {
            Some(mut existing) => {
                existing.roles = normalize_roles(
                    existing
                        .roles
                        .iter()
                        .chain(input.roles.iter())
                        .map(String::as_str),
                );
                if input.name.is_some() {
                    existing.name = input.name;
                }
                if input.image.is_some() {
                    existing.image = input.image;
                }
                existing.updated_at = now;
                existing
            }
            None => {
                let created_by_admin = match_permissions(actor, &[Permission::UserAdd])
                    .is_some_and(|permission_match| permission_match.is_matched);
                UserAccount {
                    id: Uuid::new_v4().to_string(),
                    email: email.into(),
                    name: input.name,
                    image: input.image,
                    bio: None,
                    roles: normalize_roles(input.roles.iter().map(String::as_str)),
                    status: if created_by_admin {
                        UserStatus::Active
                    } else {
                        UserStatus::Pending
                    },
                    saved_content: Vec::new(),
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        let saved = self.user_repository.save_user(account).await?;
        tracing::info!(user_id = %saved.id, status = saved.status.as_str(), "identity registered");
        Ok(saved)
    }

    /// Loads the identity behind a session cookie.
    ///
    /// Blocked or missing accounts resolve to `None`.
    pub async fn find_identity(&self, user_id: &str) -> AppResult<Option<UserIdentity>> {
        Ok(self
            .user_repository
            .find_user_by_id(user_id)
            .await?
            .filter(|account| account.status != UserStatus::Blocked)
            .map(|account| account.identity()))
    }

    /// Returns one account with the operator override projected onto its roles.
    pub async fn user_by_id(&self, actor: &UserSession, user_id: &str) -> AppResult<UserAccount> {
        require_user_view(actor)?;

        self.user_repository
            .find_user_by_id(user_id)
            .await?
            .map(|account| self.project_operator(account))
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Lists accounts carrying `role`, with the operator override projected.
    pub async fn users_by_role(
        &self,
        actor: &UserSession,
        role: &str,
    ) -> AppResult<Vec<UserAccount>> {
        require_user_view(actor)?;

        Ok(self
            .user_repository
            .list_users_by_role(role)
            .await?
            .into_iter()
            .map(|account| self.project_operator(account))
            .collect())
    }

    /// Searches accounts by name, email or bio.
    pub async fn search_users(
        &self,
        actor: &UserSession,
        text: &str,
        limit: usize,
        skip: usize,
    ) -> AppResult<UserPage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Query is required".to_owned()));
        }
        require_user_view(actor)?;

        let page = self
            .user_repository
            .search_users(text, page_limit(limit)?, skip)
            .await?;
        Ok(self.project_page(page))
    }

    /// Lists accounts passing a field filter.
    pub async fn filter_users(
        &self,
        actor: &UserSession,
        filter: UserFilter,
        limit: usize,
        skip: usize,
    ) -> AppResult<UserPage> {
        require_user_view(actor)?;

        let page = self
            .user_repository
            .filter_users(&filter, page_limit(limit)?, skip)
            .await?;
        Ok(self.project_page(page))
    }

    /// Updates name, bio or image.
    ///
    /// Requires `user_edit_others`, or `user_edit` when editing oneself.
    pub async fn update_profile(
        &self,
        actor: &UserSession,
        user_id: &str,
        patch: ProfilePatch,
    ) -> AppResult<UserAccount> {
        let denial = "You don't have the permission to edit users";
        let permission_match = require_any_permission(
            Some(actor),
            &[Permission::UserEdit, Permission::UserEditOthers],
            denial,
        )?;

        let edits_self = actor.user_id() == user_id;
        if !permission_match.holds(Permission::UserEditOthers)
            && !(edits_self && permission_match.holds(Permission::UserEdit))
        {
            return Err(AppError::Unauthorized(denial.to_owned()));
        }

        self.user_repository
            .update_profile(user_id, patch)
            .await?
            .map(|account| self.project_operator(account))
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    fn project_page(&self, page: UserPage) -> UserPage {
        UserPage {
            items: page
                .items
                .into_iter()
                .map(|account| self.project_operator(account))
                .collect(),
            total: page.total,
        }
    }

    fn project_operator(&self, mut account: UserAccount) -> UserAccount {
        if self.operator_allow_list.contains(&account.email)
            && !account.roles.iter().any(|role| role == OPERATOR_ROLE_NAME)
        {
            account.roles.push(OPERATOR_ROLE_NAME.to_owned());
        }
        account
    }
}

fn require_user_view(actor: &UserSession) -> AppResult<()> {
    require_any_permission(
        Some(actor),
        &[Permission::UserView],
        "You don't have the permission to view users",
    )
    .map(|_| ())
}
