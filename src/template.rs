use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{Html, IntoResponse, Response},
};
use std::convert::Infallible;

pub(crate) mod filters {
    use time::Date;

    /// `December 1`
    #[askama::filter_fn]
    pub fn day_label(value: &Date, _values: &dyn askama::Values) -> askama::Result<String> {
        Ok(format!("{} {}", value.month(), value.day()))
    }

    /// `Sunday, December 1, 2024`
    #[askama::filter_fn]
    pub fn long_date(value: &Date, _values: &dyn askama::Values) -> askama::Result<String> {
        Ok(format!(
            "{}, {} {}, {}",
            value.weekday(),
            value.month(),
            value.day(),
            value.year()
        ))
    }
}

/// Request-scoped renderer. Knows whether the caller is htmx so failures can
/// be answered with a fragment instead of a full page.
pub struct Template {
    pub is_htmx: bool,
}

impl Template {
    pub fn render<T: askama::Template>(&self, template: T) -> Response {
        match template.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!(err = %err, "failed to render template");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template. Error: {err}"),
                )
                    .into_response()
            }
        }
    }

    pub fn not_found(&self) -> Response {
        let response = if self.is_htmx {
            self.render(NotFoundFragment)
        } else {
            self.render(NotFoundTemplate)
        };

        (StatusCode::NOT_FOUND, response).into_response()
    }

    pub fn server_error(&self) -> Response {
        let response = if self.is_htmx {
            self.render(ServerFragment)
        } else {
            self.render(ServerTemplate)
        };

        (StatusCode::INTERNAL_SERVER_ERROR, response).into_response()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Template {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get("HX-Request")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");

        Ok(Template { is_htmx })
    }
}

#[derive(askama::Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate;

#[derive(askama::Template)]
#[template(path = "partials/404.html")]
pub struct NotFoundFragment;

#[derive(askama::Template)]
#[template(path = "500.html")]
pub struct ServerTemplate;

#[derive(askama::Template)]
#[template(path = "partials/500.html")]
pub struct ServerFragment;

#[macro_export]
macro_rules! try_page_response {
    ($result:expr, $template:expr) => {
        $crate::try_page_response!(sync: $result.await, $template)
    };

    (sync: $result:expr, $template:expr) => {
        match $result {
            Ok(r) => r,
            Err(err) => {
                tracing::error!(err = %err, "request failed");

                return $template.server_error();
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn template(htmx: bool) -> Template {
        let mut builder = Request::builder().uri("/");
        if htmx {
            builder = builder.header("HX-Request", "true");
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();

        Template::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_detects_htmx() {
        assert!(template(true).await.is_htmx);
        assert!(!template(false).await.is_htmx);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let template = template(true).await;

        assert_eq!(template.not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            template.server_error().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
