use axum::{
    body::Body,
    http::{HeaderValue, Request, Response, header},
    middleware::Next,
};

/// Embedded assets may be cached for a day, everything else is per-visitor
/// and must never be cached.
pub async fn cache_control_middleware(req: Request<Body>, next: Next) -> Response<Body> {
    let is_static = req.uri().path().starts_with("/static/");
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    if is_static {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=86400"),
        );
    } else {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "page" }))
            .route("/static/css/app.css", get(|| async { "body {}" }))
            .layer(axum::middleware::from_fn(cache_control_middleware))
    }

    async fn cache_control(uri: &str) -> anyhow::Result<String> {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty())?)
            .await?;

        Ok(response.headers()[header::CACHE_CONTROL].to_str()?.to_owned())
    }

    #[tokio::test]
    async fn test_pages_are_not_cached() -> anyhow::Result<()> {
        assert!(cache_control("/").await?.contains("no-store"));
        Ok(())
    }

    #[tokio::test]
    async fn test_static_files_are_cached() -> anyhow::Result<()> {
        assert_eq!(cache_control("/static/css/app.css").await?, "public, max-age=86400");
        Ok(())
    }
}
