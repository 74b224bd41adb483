use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use lectern_core::AppError;
use tower_http::cors::CorsLayer;

/// Credentialed CORS for the single frontend origin.
pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))
        .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]))
}

#[cfg(test)]
mod tests {
    use super::build_cors_layer;

    #[test]
    fn rejects_origin_with_control_characters() {
        assert!(build_cors_layer("http://localhost:3000\n").is_err());
        assert!(build_cors_layer("http://localhost:3000/").is_ok());
    }
}
