use std::collections::BTreeSet;

use advent_activity::{
    Assignment, CalendarWindow, CompletionState, Draw, Tracker, WindowEntry, visitor,
};
use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;
use time::{Date, Month};

use crate::routes::{AppState, Completions};
use crate::session::Session;
use crate::template::{Template, filters};

pub struct ActivityItem<'a> {
    pub position: usize,
    pub text: &'a str,
    pub date: Date,
    pub unlocked: bool,
    pub is_today: bool,
    pub completed: bool,
    /// The visitor holds a daily draw for this date.
    pub drawn: bool,
}

impl<'a> ActivityItem<'a> {
    pub fn new(
        entry: &WindowEntry<'a>,
        state: &CompletionState,
        drawn: &BTreeSet<Date>,
    ) -> Self {
        Self {
            position: entry.position,
            text: entry.text,
            date: entry.date,
            unlocked: entry.unlocked,
            is_today: entry.is_today,
            completed: state.is_completed(entry.position),
            drawn: drawn.contains(&entry.date),
        }
    }
}

pub struct TodayActivity<'a> {
    pub activity: &'a str,
    pub completed: bool,
}

#[derive(askama::Template)]
#[template(path = "partials/activity-item.html")]
pub struct ActivityItemTemplate<'a> {
    pub item: ActivityItem<'a>,
}

#[derive(askama::Template)]
#[template(path = "partials/today-activity.html")]
pub struct TodayActivityTemplate<'a> {
    pub today: TodayActivity<'a>,
}

#[derive(askama::Template)]
#[template(path = "partials/new-activity.html")]
pub struct NewActivityTemplate {
    pub draw: Assignment,
}

#[derive(askama::Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub day: u8,
    pub month: Month,
    pub start_date: Date,
    pub before_start: bool,
    pub after_end: bool,
    pub today: Option<TodayActivity<'a>>,
    pub items: Vec<ActivityItem<'a>>,
    pub draw: Option<Assignment>,
}

/// Today's entry of the window with its completion flag.
pub fn today_activity<'a>(
    window: &CalendarWindow<'a>,
    state: &CompletionState,
) -> Option<TodayActivity<'a>> {
    let entry = window.entries.get(window.today()?)?;

    Some(TodayActivity {
        activity: entry.text,
        completed: state.is_completed(entry.position),
    })
}

pub async fn page(
    template: Template,
    session: Session,
    jar: CookieJar,
    State(app): State<AppState>,
) -> impl IntoResponse {
    let today = app.clock.today();
    let window = app.sequencer.window(today);

    let completions = Completions::new(&app, &session);
    let tracker = Tracker::new(completions.store());
    let state = crate::try_page_response!(tracker.state(&session.id), template);

    let (draw, drawn) = if window.is_before_start() {
        (None, BTreeSet::new())
    } else {
        let user_id = crate::try_page_response!(
            visitor::ensure(&app.db.write_db, &session.id),
            template
        );

        let draws = Draw::new(&app.db, &app.sequencer);
        let assignment = crate::try_page_response!(draws.today(user_id, today), template);
        let drawn = crate::try_page_response!(draws.drawn_dates(user_id), template);

        (Some(assignment), drawn)
    };

    let jar = if session.should_store(&app.config.session) {
        session.store(jar, &app.config.session)
    } else {
        jar
    };

    let page = IndexTemplate {
        day: today.day(),
        month: today.month(),
        start_date: app.sequencer.start_date(),
        before_start: window.is_before_start(),
        after_end: window.is_after_end(),
        today: today_activity(&window, &state),
        items: window
            .entries
            .iter()
            .map(|entry| ActivityItem::new(entry, &state, &drawn))
            .collect(),
        draw,
    };

    (jar, template.render(page)).into_response()
}
