use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use lectern_application::{UserFilter, UserPage, UserRepository};
use lectern_core::{AppError, AppResult};
use lectern_domain::{ProfilePatch, SavedContentRef, UserAccount};
use tokio::sync::RwLock;

/// In-memory identity store keyed by account id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserAccount>>,
    mutations: AtomicUsize,
}

impl InMemoryUserRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes applied so far.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }

    async fn page_where(
        &self,
        predicate: impl Fn(&UserAccount) -> bool,
        limit: usize,
        skip: usize,
    ) -> UserPage {
        let users = self.users.read().await;

        let mut values: Vec<&UserAccount> = users.values().filter(|user| predicate(user)).collect();
        values.sort_by(|left, right| left.email.cmp(&right.email));

        UserPage {
            total: values.len() as u64,
            items: values.into_iter().skip(skip).take(limit).cloned().collect(),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_user_by_id(&self, user_id: &str) -> AppResult<Option<UserAccount>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users_by_role(&self, role: &str) -> AppResult<Vec<UserAccount>> {
        let mut values: Vec<UserAccount> = self
            .users
            .read()
            .await
            .values()
            .filter(|user| user.roles.iter().any(|value| value == role))
            .cloned()
            .collect();
        values.sort_by(|left, right| left.email.cmp(&right.email));
        Ok(values)
    }

    async fn search_users(&self, text: &str, limit: usize, skip: usize) -> AppResult<UserPage> {
        Ok(self
            .page_where(|user| user.matches_text(text), limit, skip)
            .await)
    }

    async fn filter_users(
        &self,
        filter: &UserFilter,
        limit: usize,
        skip: usize,
    ) -> AppResult<UserPage> {
        Ok(self
            .page_where(|user| filter.matches(user), limit, skip)
            .await)
    }

    async fn save_user(&self, account: UserAccount) -> AppResult<UserAccount> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|existing| existing.id != account.id && existing.email == account.email)
        {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                account.email
            )));
        }

        users.insert(account.id.clone(), account.clone());
        self.record_mutation();
        Ok(account)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> AppResult<Option<UserAccount>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };

        user.apply_profile(&patch, Utc::now());
        self.record_mutation();
        Ok(Some(user.clone()))
    }

    async fn add_saved_content(&self, user_id: &str, entry: SavedContentRef) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        if user.has_saved(&entry.reference) {
            return Ok(false);
        }

        user.saved_content.push(entry);
        user.updated_at = Utc::now();
        self.record_mutation();
        Ok(true)
    }

    async fn remove_saved_content(&self, user_id: &str, content_id: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        if !user.has_saved(content_id) {
            return Ok(false);
        }

        user.saved_content
            .retain(|entry| entry.reference != content_id);
        user.updated_at = Utc::now();
        self.record_mutation();
        Ok(true)
    }
}
