use advent_activity::{Sequencer, Tracker};
use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::{CookieJar, Form, FormRejection};
use serde::Deserialize;
use validator::Validate;

use crate::routes::index::{
    ActivityItem, ActivityItemTemplate, TodayActivity, TodayActivityTemplate, today_activity,
};
use crate::routes::{AppState, Completions, drawn_dates};
use crate::session::Session;
use crate::template::Template;

#[derive(Deserialize, Validate, Default)]
pub struct ToggleInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 500))]
    pub activity: String,
    /// Kept as text so a non-numeric value can be ignored instead of rejected.
    pub index: Option<String>,
}

impl ToggleInput {
    fn check(&self) -> advent_shared::Result<()> {
        self.validate()?;

        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Target {
    /// List item at this position.
    Item(usize),
    /// Position outside the activity list.
    OutOfRange,
    /// Today's form, toggling the resolved position if any.
    Today(Option<usize>),
}

fn resolve(input: &ToggleInput, sequencer: &Sequencer, today: Option<usize>) -> Target {
    if let Some(index) = &input.index {
        return match index.trim().parse::<i64>() {
            Ok(index) => match usize::try_from(index) {
                Ok(position) if sequencer.get(position).is_some() => Target::Item(position),
                _ => Target::OutOfRange,
            },
            Err(_) => Target::Today(None),
        };
    }

    if let Err(err) = input.check() {
        tracing::debug!(err = %err, "ignoring invalid toggle text");

        return Target::Today(None);
    }

    let is_today = today
        .and_then(|position| sequencer.get(position))
        .is_some_and(|activity| activity.text == input.activity);

    if is_today {
        return Target::Today(today);
    }

    Target::Today(sequencer.position_of(&input.activity))
}

pub async fn action(
    template: Template,
    session: Session,
    jar: CookieJar,
    State(app): State<AppState>,
    form: Result<Form<ToggleInput>, FormRejection>,
) -> impl IntoResponse {
    let input = match form {
        Ok(Form(input)) => input,
        Err(err) => {
            tracing::debug!(err = %err, "ignoring malformed toggle form");

            ToggleInput::default()
        }
    };

    let today = app.clock.today();
    let window = app.sequencer.window(today);

    let target = resolve(&input, &app.sequencer, window.today());
    let position = match target {
        Target::OutOfRange => {
            tracing::debug!(index = ?input.index, "toggle index out of range");

            return template.not_found();
        }
        Target::Item(position) | Target::Today(Some(position)) => Some(position),
        Target::Today(None) => None,
    };

    let completions = Completions::new(&app, &session);
    let tracker = Tracker::new(completions.store());

    if let Some(position) = position {
        crate::try_page_response!(tracker.toggle(&session.id, position), template);
    }

    let state = crate::try_page_response!(tracker.state(&session.id), template);

    let fragment = match target {
        Target::Item(position) => {
            let drawn = crate::try_page_response!(drawn_dates(&app, &session), template);
            let item = match window.entries.get(position) {
                Some(entry) => ActivityItem::new(entry, &state, &drawn),
                // Nothing is listed before the start date.
                None => match app.sequencer.get(position) {
                    Some(activity) => {
                        let date = app.sequencer.date_of(position);

                        ActivityItem {
                            position,
                            text: activity.text,
                            date,
                            unlocked: false,
                            is_today: false,
                            completed: state.is_completed(position),
                            drawn: drawn.contains(&date),
                        }
                    }
                    None => return template.not_found(),
                },
            };

            template.render(ActivityItemTemplate { item })
        }
        _ => {
            let today = match position.and_then(|p| app.sequencer.get(p)) {
                Some(activity) => Some(TodayActivity {
                    activity: activity.text,
                    completed: state.is_completed(activity.position),
                }),
                None => today_activity(&window, &state),
            };

            let today = today.unwrap_or(TodayActivity {
                activity: &input.activity,
                completed: false,
            });

            template.render(TodayActivityTemplate { today })
        }
    };

    respond(&app, session, completions, jar, fragment)
}

/// Writes the session cookie when it is new, close to expiry, or carries the
/// updated completion state.
fn respond(
    app: &AppState,
    mut session: Session,
    completions: Completions,
    jar: CookieJar,
    fragment: axum::response::Response,
) -> axum::response::Response {
    let changed = match completions.into_session_state() {
        Some(state) => {
            let changed = state != session.completed;
            session.completed = state;
            changed
        }
        None => false,
    };

    let jar = if changed || session.should_store(&app.config.session) {
        session.store(jar, &app.config.session)
    } else {
        jar
    };

    (jar, fragment).into_response()
}
