use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post, put};
use lectern_core::AppError;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::state::AppState;
use crate::{auth, handlers, middleware};

mod cors;

pub fn build_router<S>(
    app_state: AppState,
    frontend_url: &str,
    session_layer: SessionManagerLayer<S>,
) -> Result<Router, AppError>
where
    S: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/refresh", post(auth::refresh_handler))
        .route(
            "/api/permissions",
            get(handlers::roles::list_permissions_handler),
        )
        .route(
            "/api/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/roles/by-name/{name}",
            get(handlers::roles::role_by_name_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(handlers::roles::role_by_id_handler),
        )
        .route(
            "/api/roles/{role_id}/status",
            put(handlers::roles::update_role_status_handler),
        )
        .route(
            "/api/users/search",
            get(handlers::users::search_users_handler),
        )
        .route(
            "/api/users/filter",
            get(handlers::users::filter_users_handler),
        )
        .route(
            "/api/users/by-role/{role}",
            get(handlers::users::users_by_role_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::user_by_id_handler).put(handlers::users::update_profile_handler),
        )
        .route_layer(from_fn(middleware::require_session));

    let content_routes = Router::new()
        .route(
            "/api/content/{kind}/top",
            get(handlers::content::top_content_handler),
        )
        .route(
            "/api/content/{kind}/search",
            get(handlers::content::search_content_handler),
        )
        .route(
            "/api/content/{kind}/by-author/{author_id}",
            get(handlers::content::content_by_author_handler),
        )
        .route(
            "/api/content/{kind}/slug/{slug}",
            get(handlers::content::content_by_slug_handler),
        )
        .route(
            "/api/content/{kind}/slug/{slug}/view",
            post(handlers::content::view_content_handler),
        )
        .route(
            "/api/content/{kind}/{content_id}",
            get(handlers::content::content_by_id_handler),
        )
        .route(
            "/api/content/{kind}/{content_id}/like",
            post(handlers::content::like_content_handler)
                .delete(handlers::content::unlike_content_handler),
        )
        .route(
            "/api/content/{kind}/{content_id}/save",
            post(handlers::content::save_content_handler)
                .delete(handlers::content::unsave_content_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/auth/bootstrap", post(auth::bootstrap_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(content_routes)
        .merge(protected_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_caller,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .layer(session_layer)
        .with_state(app_state))
}

#[cfg(test)]
mod tests;
