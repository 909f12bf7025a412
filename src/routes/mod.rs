use std::{collections::BTreeSet, sync::Arc};

use advent_activity::{
    CompletionState, CompletionStore, DatabaseStore, Draw, Sequencer, SessionStore, visitor,
};
use anyhow::Context;
use axum::{
    Router,
    response::IntoResponse,
    routing::{get, post},
};
use time::Date;

use crate::{
    clock::Clock,
    config::{CompletionBackend, Config},
    session::Session,
    template::Template,
};

mod assets;
mod health;
mod history;
mod index;
mod new_activity;
mod toggle;

pub use assets::AssetsService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sequencer: Arc<Sequencer>,
    pub clock: Clock,
    pub db: advent_shared::State,
}

impl AppState {
    pub fn new(config: Config, db: advent_shared::State, clock: Clock) -> anyhow::Result<Self> {
        let start_date = config
            .calendar
            .start_date()
            .context("invalid calendar.start_date")?;
        let sequencer = Sequencer::new(start_date, config.calendar.activities.iter().cloned())?;

        Ok(Self {
            config,
            sequencer: Arc::new(sequencer),
            clock,
            db,
        })
    }
}

/// Completion store for one request, picked by `completion.backend`.
pub(crate) enum Completions {
    Session(SessionStore),
    Database(DatabaseStore),
}

impl Completions {
    pub fn new(app: &AppState, session: &Session) -> Self {
        match app.config.completion.backend {
            CompletionBackend::Session => Self::Session(SessionStore::new(
                session.id.to_owned(),
                session.completed.clone(),
            )),
            CompletionBackend::Database => Self::Database(DatabaseStore(app.db.clone())),
        }
    }

    pub fn store(&self) -> &dyn CompletionStore {
        match self {
            Self::Session(store) => store as &dyn CompletionStore,
            Self::Database(store) => store,
        }
    }

    /// State to write back into the session cookie, if the cookie holds it.
    pub fn into_session_state(self) -> Option<CompletionState> {
        match self {
            Self::Session(store) => Some(store.into_state()),
            Self::Database(_) => None,
        }
    }
}

/// Dates with a daily draw for the visitor, empty until their first visit.
pub(crate) async fn drawn_dates(
    app: &AppState,
    session: &Session,
) -> advent_shared::Result<BTreeSet<Date>> {
    match visitor::find(&app.db.read_db, &session.id).await? {
        Some(user_id) => {
            Draw::new(&app.db, &app.sequencer)
                .drawn_dates(user_id)
                .await
        }
        None => Ok(BTreeSet::new()),
    }
}

pub async fn fallback(template: Template) -> impl IntoResponse {
    template.not_found()
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(app_state.db.read_db.clone())
        .route("/", get(index::page))
        .route("/toggle-activity", post(toggle::action))
        .route("/new-activity", post(new_activity::action))
        .route("/history", get(history::page))
        .nest_service("/static", AssetsService::new())
        .fallback(fallback)
        .with_state(app_state)
}
