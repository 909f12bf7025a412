use advent_activity::{Draw, visitor};
use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::CookieJar;

use crate::routes::AppState;
use crate::routes::index::NewActivityTemplate;
use crate::session::Session;
use crate::template::Template;

pub async fn action(
    template: Template,
    session: Session,
    jar: CookieJar,
    State(app): State<AppState>,
) -> impl IntoResponse {
    let today = app.clock.today();
    let user_id = crate::try_page_response!(
        visitor::ensure(&app.db.write_db, &session.id),
        template
    );

    let draw = crate::try_page_response!(
        Draw::new(&app.db, &app.sequencer).reroll(user_id, today),
        template
    );

    let jar = if session.should_store(&app.config.session) {
        session.store(jar, &app.config.session)
    } else {
        jar
    };

    (jar, template.render(NewActivityTemplate { draw })).into_response()
}
