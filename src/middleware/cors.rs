//! CORS policy for browser clients (the login form and the SPA calling protected routes).
//!
//! Policy:
//! - Development: permissive (Allow-Origin: *), WITHOUT credentials.
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`, WITHOUT credentials.
//!   An empty allowlist allows no cross-origin caller.
//!
//! Tokens travel in the Authorization header, never in cookies, so credentials stay off.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config))
}

fn layer(config: &Config) -> CorsLayer {
    let cors = if config.app_env.is_production() {
        let allowed: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        CorsLayer::new().allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _req| allowed.iter().any(|v| v == origin),
        ))
    } else {
        CorsLayer::new().allow_origin(Any)
    };

    cors.allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    async fn allow_origin(config: &Config, origin: &str) -> Option<HeaderValue> {
        let app = apply(Router::new().route("/x", get(|| async { "x" })), config);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/x")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .cloned()
    }

    #[tokio::test]
    async fn development_allows_any_origin() {
        let config = config(&[]);
        let origin = allow_origin(&config, "https://anything.example").await;
        assert_eq!(origin.unwrap(), "*");
    }

    #[tokio::test]
    async fn production_uses_allowlist() {
        let config = config(&[
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://db/users"),
            ("CORS_ALLOWED_ORIGINS", "https://shop.example"),
        ]);
        assert_eq!(
            allow_origin(&config, "https://shop.example").await.unwrap(),
            "https://shop.example"
        );
        assert!(allow_origin(&config, "https://evil.example").await.is_none());
    }
}
