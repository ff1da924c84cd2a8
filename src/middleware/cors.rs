use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any)
}

/// CORS pinned to the web client's origin when `SITE_URL` is set.
pub fn site_cors(site_url: Option<&str>) -> CorsLayer {
    let Some(origin) = site_url.and_then(|url| HeaderValue::from_str(url.trim_end_matches('/')).ok())
    else {
        return permissive_cors();
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
