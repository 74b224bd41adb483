use async_trait::async_trait;
use lectern_core::AppResult;
use lectern_domain::{ProfilePatch, SavedContentRef, UserAccount, UserStatus};

/// Profile data handed over by the identity provider on sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterIdentityInput {
    /// Account email.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Avatar image URL.
    pub image: Option<String>,
    /// Extra role names requested for the account.
    pub roles: Vec<String>,
}

/// Field filter over accounts. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    /// Exact lifecycle state.
    pub status: Option<UserStatus>,
    /// Role name the account must carry.
    pub role: Option<String>,
    /// Exact email, compared lowercased.
    pub email: Option<String>,
}

impl UserFilter {
    /// Returns whether the account passes every set field.
    #[must_use]
    pub fn matches(&self, account: &UserAccount) -> bool {
        self.status.is_none_or(|status| account.status == status)
            && self
                .role
                .as_deref()
                .is_none_or(|role| account.roles.iter().any(|value| value == role))
            && self
                .email
                .as_deref()
                .is_none_or(|email| account.email.eq_ignore_ascii_case(email))
    }
}

/// One page of accounts with the total number of matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPage {
    /// Accounts on this page.
    pub items: Vec<UserAccount>,
    /// Accounts matching the query before paging.
    pub total: u64,
}

/// Repository port for account records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds one account by id.
    async fn find_user_by_id(&self, user_id: &str) -> AppResult<Option<UserAccount>>;

    /// Finds one account by lowercased email.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>>;

    /// Lists accounts carrying a role name.
    async fn list_users_by_role(&self, role: &str) -> AppResult<Vec<UserAccount>>;

    /// Searches name, email and bio case-insensitively, ordered by email.
    async fn search_users(&self, text: &str, limit: usize, skip: usize) -> AppResult<UserPage>;

    /// Lists accounts passing a field filter, ordered by email.
    async fn filter_users(
        &self,
        filter: &UserFilter,
        limit: usize,
        skip: usize,
    ) -> AppResult<UserPage>;

    /// Inserts or replaces an account, keyed by id.
    async fn save_user(&self, account: UserAccount) -> AppResult<UserAccount>;

    /// Applies a profile patch, returning the updated account.
    async fn update_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> AppResult<Option<UserAccount>>;

    /// Set-adds a saved content reference. Returns whether the account changed.
    async fn add_saved_content(&self, user_id: &str, entry: SavedContentRef) -> AppResult<bool>;

    /// Removes a saved content reference. Returns whether the account changed.
    async fn remove_saved_content(&self, user_id: &str, content_id: &str) -> AppResult<bool>;
}
