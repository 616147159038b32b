use axum::http::{header, HeaderValue, Method};
use std::env;
use tower_http::cors::{AllowOrigin, CorsLayer};

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

const PREFLIGHT_MAX_AGE_SECS: u64 = 3600;

pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn allowed_origins() -> AllowOrigin {
    let configured =
        env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string());

    let mut origins = Vec::new();
    for origin in configured.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        match origin.parse::<HeaderValue>() {
            Ok(value) => origins.push(value),
            Err(e) => tracing::warn!("CORS: skipping invalid origin '{}': {}", origin, e),
        }
    }

    if origins.is_empty() {
        // Credentials are enabled, so a wildcard origin is not an option.
        tracing::warn!("CORS: no valid origins configured, falling back to the default");
        if let Ok(value) = DEFAULT_ALLOWED_ORIGINS.parse::<HeaderValue>() {
            origins.push(value);
        }
    }

    AllowOrigin::list(origins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_layer_builds() {
        let _layer = create_cors_layer();
    }

    #[test]
    fn default_origin_parses() {
        assert!(DEFAULT_ALLOWED_ORIGINS.parse::<HeaderValue>().is_ok());
    }
}
