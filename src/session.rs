//! Anonymous visitor sessions carried in a signed cookie.

use std::{
    convert::Infallible,
    time::{SystemTime, UNIX_EPOCH},
};

use advent_activity::CompletionState;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::SessionConfig, routes::AppState};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Session id (ULID)
    pub sub: String,
    /// Completed positions, used by the session completion backend
    #[serde(default)]
    pub completed: Vec<usize>,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub completed: CompletionState,
    /// No valid cookie came with the request.
    pub is_new: bool,
    /// `exp` of the cookie the session came from, 0 when new.
    pub expires_at: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            completed: CompletionState::default(),
            is_new: true,
            expires_at: 0,
        }
    }
}

fn now() -> anyhow::Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl Session {
    pub fn encode(&self, config: &SessionConfig) -> anyhow::Result<String> {
        let now = now()?;
        let lifetime = u64::try_from(config.lifetime_days)? * 24 * 60 * 60;
        let claims = Claims {
            sub: self.id.to_owned(),
            completed: self.completed.positions().collect(),
            iat: now,
            exp: now + lifetime,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )?;

        Ok(token)
    }

    pub fn decode(token: &str, config: &SessionConfig) -> anyhow::Result<Self> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.secret.as_bytes()),
            &validation,
        )?;

        if ulid::Ulid::from_string(&data.claims.sub).is_err() {
            anyhow::bail!("session id is not a ulid");
        }

        Ok(Self {
            id: data.claims.sub,
            completed: data.claims.completed.into_iter().collect(),
            is_new: false,
            expires_at: data.claims.exp,
        })
    }

    /// Less than half of the configured lifetime is left on the cookie.
    pub fn needs_refresh(&self, config: &SessionConfig) -> bool {
        let Ok(now) = now() else {
            return false;
        };
        let half_lifetime = u64::try_from(config.lifetime_days).unwrap_or_default() * 12 * 60 * 60;

        self.expires_at.saturating_sub(now) < half_lifetime
    }

    /// The response must carry a (re-)issued cookie.
    pub fn should_store(&self, config: &SessionConfig) -> bool {
        self.is_new || self.needs_refresh(config)
    }

    pub fn build_cookie<'a>(&self, config: &SessionConfig) -> anyhow::Result<Cookie<'a>> {
        let token = self.encode(config)?;

        Ok(Cookie::build((config.cookie_name.to_owned(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::days(config.lifetime_days))
            .build())
    }

    /// Adds the session cookie to `jar`. Encoding failures are logged and the
    /// jar is returned unchanged.
    pub fn store(&self, jar: CookieJar, config: &SessionConfig) -> CookieJar {
        match self.build_cookie(config) {
            Ok(cookie) => jar.add(cookie),
            Err(err) => {
                tracing::error!(session = %self.id, err = %err, "failed to encode session cookie");

                jar
            }
        }
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let config = &state.config.session;

        let Some(cookie) = jar.get(&config.cookie_name) else {
            return Ok(Session::default());
        };

        match Session::decode(cookie.value(), config) {
            Ok(session) => Ok(session),
            Err(err) => {
                tracing::debug!(err = %err, "discarding invalid session cookie");

                Ok(Session::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SessionConfig {
        SessionConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_string(),
            cookie_name: "advent_session".to_string(),
            lifetime_days: 30,
        }
    }

    #[test]
    fn test_encode_decode_keeps_completions() {
        let mut session = Session::default();
        session.completed.toggle(2);
        session.completed.toggle(7);

        let token = session.encode(&config()).unwrap();
        let decoded = Session::decode(&token, &config()).unwrap();

        assert_eq!(decoded.id, session.id);
        assert_eq!(decoded.completed, session.completed);
        assert!(!decoded.is_new);
    }

    #[test]
    fn test_decode_rejects_other_secret() {
        let token = Session::default().encode(&config()).unwrap();
        let mut other = config();
        other.secret = "another_secret_key_minimum_32_characters".to_string();

        assert!(Session::decode(&token, &other).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Session::decode("not-a-token", &config()).is_err());
    }

    #[test]
    fn test_refresh_when_close_to_expiry() {
        let config = config();
        let token = Session::default().encode(&config).unwrap();
        let fresh = Session::decode(&token, &config).unwrap();

        assert!(!fresh.needs_refresh(&config));
        assert!(!fresh.should_store(&config));

        let aging = Session {
            expires_at: now().unwrap() + 24 * 60 * 60,
            ..fresh.clone()
        };
        assert!(aging.needs_refresh(&config));
        assert!(aging.should_store(&config));

        assert!(Session::default().should_store(&config));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = Session::default().build_cookie(&config()).unwrap();

        assert_eq!(cookie.name(), "advent_session");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
