#![allow(dead_code)]

use advent::{AppState, Clock, Config};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use temp_dir::TempDir;
use time::Date;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: advent_shared::State,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    /// `name=value` pair of the session cookie, when one was set.
    pub cookie: Option<String>,
    pub body: String,
}

pub fn config() -> anyhow::Result<Config> {
    let mut config = Config::load(Some("does-not-exist.toml".to_owned()))?;
    config.session.secret = "test_secret_key_minimum_32_characters_long".to_owned();
    config.calendar.start_date = "2024-12-01".to_owned();
    config.calendar.activities = advent_activity::default_activities();

    Ok(config)
}

pub async fn setup_test_app(today: Date, config: Config) -> anyhow::Result<TestApp> {
    let dir = TempDir::new()?;
    let url = format!("sqlite:{}", dir.child("advent.db").display());
    let pool = advent::db::create_pool(&url, 1).await?;
    advent::cli::run_migrations(&pool).await?;

    let db = advent_shared::State::single(pool);
    let state = AppState::new(config, db.clone(), Clock::Fixed(today))?;

    Ok(TestApp {
        router: advent::router(state),
        db,
        _dir: dir,
    })
}

impl TestApp {
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> anyhow::Result<TestResponse> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        self.send(request.body(Body::empty())?).await
    }

    pub async fn post(
        &self,
        uri: &str,
        form: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> anyhow::Result<TestResponse> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("HX-Request", "true")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let body = serde_urlencoded::to_string(form)?;

        self.send(request.body(Body::from(body))?).await
    }

    async fn send(&self, request: Request<Body>) -> anyhow::Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_owned);

        let bytes = response.into_body().collect().await?.to_bytes();

        Ok(TestResponse {
            status,
            cookie,
            body: String::from_utf8(bytes.to_vec())?,
        })
    }
}
