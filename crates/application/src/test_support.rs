use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use lectern_core::{AppError, AppResult, UserIdentity};
use lectern_domain::{
    ContentDocument, ContentFilter, ContentKind, ContentUpdate, MemberRef, Permission,
    PermissionSet, ProfilePatch, Role, RoleStatus, SavedContentRef, UserAccount, UserSession,
    UserStatus,
};
use tokio::sync::Mutex;

use crate::{
    ContentPage, ContentRepository, ContentSearchQuery, PathRevalidator, RoleRepository,
    TopContentQuery, UserFilter, UserPage, UserRepository,
};

#[derive(Default)]
pub(crate) struct FakeRoleRepository {
    pub(crate) roles: Mutex<Vec<Role>>,
    pub(crate) unavailable: AtomicBool,
    pub(crate) lookups: AtomicUsize,
}

impl FakeRoleRepository {
    pub(crate) fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles: Mutex::new(roles),
            ..Self::default()
        }
    }

    pub(crate) fn unavailable() -> Self {
        let repository = Self::default();
        repository.unavailable.store(true, Ordering::SeqCst);
        repository
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("role store connection refused".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeRoleRepository {
    async fn find_active_roles_by_names(&self, names: &[String]) -> AppResult<Vec<Role>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|role| role.is_active() && names.contains(&role.name))
            .cloned()
            .collect())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.check_available()?;
        Ok(self.roles.lock().await.clone())
    }

    async fn find_role_by_id(&self, role_id: &str) -> AppResult<Option<Role>> {
        self.check_available()?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.id == role_id)
            .cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.check_available()?;
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.name == name)
            .cloned())
    }

    async fn create_role(&self, role: Role) -> AppResult<Role> {
        self.check_available()?;
        let mut roles = self.roles.lock().await;
        if roles.iter().any(|existing| existing.name == role.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name
            )));
        }
        roles.push(role.clone());
        Ok(role)
    }

    async fn update_role_status(
        &self,
        role_id: &str,
        status: RoleStatus,
        updated_by: &str,
    ) -> AppResult<Option<Role>> {
        self.check_available()?;
        let mut roles = self.roles.lock().await;
        let Some(role) = roles.iter_mut().find(|role| role.id == role_id) else {
            return Ok(None);
        };
        role.status = status;
        role.updated_by = updated_by.to_owned();
        Ok(Some(role.clone()))
    }
}

#[derive(Default)]
pub(crate) struct FakeContentRepository {
    pub(crate) documents: Mutex<HashMap<String, ContentDocument>>,
    pub(crate) mutations: AtomicUsize,
    pub(crate) case_insensitive_lookup: AtomicBool,
    pub(crate) searches: Mutex<Vec<ContentSearchQuery>>,
}

impl FakeContentRepository {
    pub(crate) fn with_documents(documents: Vec<ContentDocument>) -> Self {
        Self {
            documents: Mutex::new(
                documents
                    .into_iter()
                    .map(|document| (document.id.clone(), document))
                    .collect(),
            ),
            mutations: AtomicUsize::new(0),
            case_insensitive_lookup: AtomicBool::new(false),
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Resolves ids regardless of letter case, like a store that parses uuids.
    pub(crate) fn with_case_insensitive_lookup(self) -> Self {
        self.case_insensitive_lookup.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) async fn document(&self, content_id: &str) -> Option<ContentDocument> {
        self.documents.lock().await.get(content_id).cloned()
    }

    pub(crate) fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentRepository for FakeContentRepository {
    async fn find_content_by_id(&self, content_id: &str) -> AppResult<Option<ContentDocument>> {
        if self.case_insensitive_lookup.load(Ordering::SeqCst) {
            return Ok(self
                .documents
                .lock()
                .await
                .values()
                .find(|document| document.id.eq_ignore_ascii_case(content_id))
                .cloned());
        }
        Ok(self.document(content_id).await)
    }

    async fn find_content_by_slug(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> AppResult<Option<ContentDocument>> {
        Ok(self
            .documents
            .lock()
            .await
            .values()
            .find(|document| document.kind == kind && document.slug == slug)
            .cloned())
    }

    async fn list_content_by_author(
        &self,
        kind: ContentKind,
        author_id: &str,
        include_drafts: bool,
    ) -> AppResult<Vec<ContentDocument>> {
        Ok(self
            .documents
            .lock()
            .await
            .values()
            .filter(|document| {
                document.kind == kind
                    && document.is_authored_by(author_id)
                    && (include_drafts || document.is_published)
            })
            .cloned()
            .collect())
    }

    async fn list_top_content(&self, query: TopContentQuery) -> AppResult<ContentPage> {
        let documents = self.documents.lock().await;
        let mut items: Vec<ContentDocument> = documents
            .values()
            .filter(|document| document.kind == query.kind && document.is_published)
            .cloned()
            .collect();
        let total = items.len() as u64;
        items.sort_by_key(|document| std::cmp::Reverse(query.order_by.counter_value(document)));
        Ok(ContentPage {
            items: items.into_iter().skip(query.skip).take(query.limit).collect(),
            total,
        })
    }

    async fn search_content(&self, query: ContentSearchQuery) -> AppResult<ContentPage> {
        let documents = self.documents.lock().await;
        let mut items: Vec<ContentDocument> = documents
            .values()
            .filter(|document| {
                document.kind == query.kind
                    && (query.include_drafts || document.is_published)
                    && document.matches_text(&query.text)
            })
            .cloned()
            .collect();
        let total = items.len() as u64;
        items.sort_by(|left, right| left.slug.cmp(&right.slug));
        let page = items.into_iter().skip(query.skip).take(query.limit).collect();
        self.searches.lock().await.push(query);
        Ok(ContentPage { items: page, total })
    }

    async fn find_one_and_update(
        &self,
        filter: ContentFilter,
        update: ContentUpdate,
    ) -> AppResult<Option<ContentDocument>> {
        let mut documents = self.documents.lock().await;
        let Some(document) = documents.get_mut(filter.content_id()) else {
            return Ok(None);
        };
        if !filter.matches(document) {
            return Ok(None);
        }
        update.apply(document, Utc::now());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(Some(document.clone()))
    }
}

#[derive(Default)]
pub(crate) struct FakeUserRepository {
    pub(crate) users: Mutex<HashMap<String, UserAccount>>,
    pub(crate) mutations: AtomicUsize,
}

impl FakeUserRepository {
    pub(crate) fn with_users(users: Vec<UserAccount>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().map(|user| (user.id.clone(), user)).collect()),
            mutations: AtomicUsize::new(0),
        }
    }

    pub(crate) async fn user(&self, user_id: &str) -> Option<UserAccount> {
        self.users.lock().await.get(user_id).cloned()
    }

    pub(crate) fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_user_by_id(&self, user_id: &str) -> AppResult<Option<UserAccount>> {
        Ok(self.user(user_id).await)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn list_users_by_role(&self, role: &str) -> AppResult<Vec<UserAccount>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|user| user.roles.iter().any(|value| value == role))
            .cloned()
            .collect())
    }

    async fn search_users(&self, text: &str, limit: usize, skip: usize) -> AppResult<UserPage> {
        Ok(page_of_users(
            self.users
                .lock()
                .await
                .values()
                .filter(|user| user.matches_text(text))
                .cloned()
                .collect(),
            limit,
            skip,
        ))
    }

    async fn filter_users(
        &self,
        filter: &UserFilter,
        limit: usize,
        skip: usize,
    ) -> AppResult<UserPage> {
        Ok(page_of_users(
            self.users
                .lock()
                .await
                .values()
                .filter(|user| filter.matches(user))
                .cloned()
                .collect(),
            limit,
            skip,
        ))
    }

    async fn save_user(&self, account: UserAccount) -> AppResult<UserAccount> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.users
            .lock()
            .await
            .insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn update_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> AppResult<Option<UserAccount>> {
        let mut users = self.users.lock().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };
        user.apply_profile(&patch, Utc::now());
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(Some(user.clone()))
    }

    async fn add_saved_content(&self, user_id: &str, entry: SavedContentRef) -> AppResult<bool> {
        let mut users = self.users.lock().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        if user.has_saved(&entry.reference) {
            return Ok(false);
        }
        user.saved_content.push(entry);
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn remove_saved_content(&self, user_id: &str, content_id: &str) -> AppResult<bool> {
        let mut users = self.users.lock().await;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        let before = user.saved_content.len();
        user.saved_content
            .retain(|entry| entry.reference != content_id);
        let changed = user.saved_content.len() != before;
        if changed {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(changed)
    }
}

fn page_of_users(mut users: Vec<UserAccount>, limit: usize, skip: usize) -> UserPage {
    users.sort_by(|left, right| left.email.cmp(&right.email));
    UserPage {
        total: users.len() as u64,
        items: users.into_iter().skip(skip).take(limit).collect(),
    }
}

#[derive(Default)]
pub(crate) struct RecordingRevalidator {
    pub(crate) paths: Mutex<Vec<String>>,
}

#[async_trait]
impl PathRevalidator for RecordingRevalidator {
    async fn revalidate_path(&self, path: &str) -> AppResult<()> {
        self.paths.lock().await.push(path.to_owned());
        Ok(())
    }
}

pub(crate) fn member(id: &str) -> MemberRef {
    MemberRef {
        id: id.to_owned(),
        email: format!("{id}@example.com"),
        name: Some(id.to_owned()),
        image: None,
    }
}

pub(crate) fn account(id: &str, roles: &[&str]) -> UserAccount {
    let now = Utc::now();
    UserAccount {
        id: id.to_owned(),
        email: format!("{id}@example.com"),
        name: Some(id.to_owned()),
        image: None,
        bio: None,
        roles: roles.iter().map(|role| (*role).to_owned()).collect(),
        status: UserStatus::Active,
        saved_content: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn published_blog(id: &str, slug: &str) -> ContentDocument {
    ContentDocument::draft(id, ContentKind::Blog, slug, "Title", member("author"), Utc::now())
        .published()
}

pub(crate) fn session_with(user_id: &str, permissions: &[Permission]) -> UserSession {
    let mut granted = PermissionSet::default_user();
    granted.grant_all(permissions.iter().copied());
    UserSession::new(
        UserIdentity::new(
            user_id,
            format!("{user_id}@example.com"),
            Some(user_id.to_owned()),
            vec!["user".to_owned()],
        ),
        ["user".to_owned()].into_iter().collect(),
        granted,
    )
}

pub(crate) fn role(id: &str, name: &str, permissions: &[Permission], status: RoleStatus) -> Role {
    let now = Utc::now();
    Role {
        id: id.to_owned(),
        name: name.to_owned(),
        description: String::new(),
        rank: 3,
        permissions: permissions.iter().copied().collect(),
        status,
        created_by: "system".to_owned(),
        updated_by: "system".to_owned(),
        created_at: now,
        updated_at: now,
    }
}
