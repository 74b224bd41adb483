use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use lectern_application::CallerContext;
use lectern_core::AppError;
use lectern_domain::UserSession;
use tower_sessions::Session;

use crate::auth::SESSION_USER_KEY;
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the caller's permissions for every request.
///
/// The cookie only carries the account id; roles and permissions are
/// recomputed here so role edits apply on the next request.
pub async fn resolve_caller(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let ip_address = client_ip(request.headers());
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    let identity = match user_id {
        Some(user_id) => state.user_service.find_identity(user_id.as_str()).await?,
        None => None,
    };

    let caller = match identity {
        Some(identity) => CallerContext::authenticated(
            state.session_resolver.resolve(identity).await,
            ip_address,
        ),
        None => CallerContext::anonymous(ip_address),
    };

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// Rejects anonymous callers and exposes their session as an extension.
pub async fn require_session(mut request: Request, next: Next) -> ApiResult<Response> {
    let session = request
        .extensions()
        .get::<CallerContext>()
        .and_then(|caller| caller.session.clone())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    request.extensions_mut().insert::<UserSession>(session);
    Ok(next.run(request).await)
}

/// Client address from `x-forwarded-for` (first hop) or `x-real-ip`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok());

    [forwarded, real_ip]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};

    use super::client_ip;

    #[test]
    fn forwarded_for_wins_and_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));

        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" "));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));

        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn missing_headers_yield_no_address() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }
}
