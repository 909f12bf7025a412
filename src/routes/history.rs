use advent_activity::{Assignment, Draw, visitor};
use axum::{extract::State, response::IntoResponse};

use crate::routes::AppState;
use crate::session::Session;
use crate::template::{Template, filters};

#[derive(askama::Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub assignments: Vec<Assignment>,
}

pub async fn page(
    template: Template,
    session: Session,
    State(app): State<AppState>,
) -> impl IntoResponse {
    let user_id = crate::try_page_response!(
        visitor::find(&app.db.read_db, &session.id),
        template
    );

    let assignments = match user_id {
        Some(user_id) => crate::try_page_response!(
            Draw::new(&app.db, &app.sequencer).history(user_id),
            template
        ),
        None => vec![],
    };

    template.render(HistoryTemplate { assignments })
}
