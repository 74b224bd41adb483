use std::sync::Arc;

use lectern_infrastructure::{
    PostgresContentRepository, PostgresRoleRepository, PostgresUserRepository,
    TracingPathRevalidator,
};
use sqlx::PgPool;

use crate::api_config::ApiConfig;
use crate::state::{AppState, Repositories};

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> AppState {
    AppState::new(
        Repositories {
            content: Arc::new(PostgresContentRepository::new(pool.clone())),
            roles: Arc::new(PostgresRoleRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool)),
            revalidator: Arc::new(TracingPathRevalidator),
        },
        config.operator_emails.clone(),
        config.bootstrap_token.clone(),
    )
}
