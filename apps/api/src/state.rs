use std::sync::Arc;

use lectern_application::{
    ContentRepository, ContentService, EngagementService, OperatorAllowList, PathRevalidator,
    RoleRepository, RoleService, SessionResolver, UserRepository, UserService,
};

/// Port implementations the services are wired against.
pub struct Repositories {
    pub content: Arc<dyn ContentRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub users: Arc<dyn UserRepository>,
    pub revalidator: Arc<dyn PathRevalidator>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session_resolver: SessionResolver,
    pub user_service: UserService,
    pub role_service: RoleService,
    pub content_service: ContentService,
    pub engagement_service: EngagementService,
    pub bootstrap_token: String,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        operator_allow_list: OperatorAllowList,
        bootstrap_token: String,
    ) -> Self {
        Self {
            session_resolver: SessionResolver::new(
                repositories.roles.clone(),
                operator_allow_list.clone(),
            ),
            user_service: UserService::new(repositories.users.clone(), operator_allow_list),
            role_service: RoleService::new(repositories.roles),
            content_service: ContentService::new(repositories.content.clone()),
            engagement_service: EngagementService::new(
                repositories.content,
                repositories.users,
                repositories.revalidator,
            ),
            bootstrap_token,
        }
    }
}
