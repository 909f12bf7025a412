use std::collections::{BTreeSet, HashSet};

use advent_db::table::UserActivities;
use advent_shared::State;
use rand::seq::IndexedRandom;
use sea_query::{Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, prelude::FromRow};
use time::Date;

use crate::Sequencer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub activity: String,
    pub date: Date,
}

#[derive(FromRow)]
struct AssignmentRow {
    activity: String,
    activity_date: i64,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = advent_shared::Error;

    fn try_from(value: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            activity: value.activity,
            date: crate::timestamp_day(value.activity_date)?,
        })
    }
}

/// Candidate pool for a draw: activities the visitor has never been assigned,
/// falling back to the whole list once every activity has been seen.
///
/// `exclude` is removed from the pool unless nothing else is left. Texts are
/// deduplicated so each distinct activity has the same chance.
pub fn candidates<'a>(
    sequencer: &'a Sequencer,
    seen: &HashSet<String>,
    exclude: Option<&str>,
) -> Vec<&'a str> {
    let mut distinct = HashSet::new();
    let all = sequencer
        .activities()
        .map(|a| a.text)
        .filter(|text| distinct.insert(*text))
        .collect::<Vec<_>>();

    let allowed = all
        .iter()
        .copied()
        .filter(|text| Some(*text) != exclude)
        .collect::<Vec<_>>();

    let unseen = allowed
        .iter()
        .copied()
        .filter(|text| !seen.contains(*text))
        .collect::<Vec<_>>();

    if !unseen.is_empty() {
        return unseen;
    }

    if !allowed.is_empty() {
        return allowed;
    }

    all
}

fn pick<'a>(candidates: &[&'a str]) -> Option<&'a str> {
    candidates.choose(&mut rand::rng()).copied()
}

/// Sticky per-day random assignment of one activity per visitor.
pub struct Draw<'a> {
    state: &'a State,
    sequencer: &'a Sequencer,
}

impl<'a> Draw<'a> {
    pub fn new(state: &'a State, sequencer: &'a Sequencer) -> Self {
        Self { state, sequencer }
    }

    /// Today's assignment, drawn and stored on first read.
    pub async fn today(&self, user_id: i64, date: Date) -> advent_shared::Result<Assignment> {
        let mut tx = self.state.write_db.begin().await?;

        if let Some(assignment) = find(&mut tx, user_id, date).await? {
            tx.commit().await?;

            return Ok(assignment);
        }

        let assignment = self.assign(&mut tx, user_id, date, None).await?;
        tx.commit().await?;

        tracing::info!(user = user_id, activity = %assignment.activity, "activity assigned");

        Ok(assignment)
    }

    /// Drops today's assignment and draws again, excluding the replaced
    /// activity when another candidate exists.
    pub async fn reroll(&self, user_id: i64, date: Date) -> advent_shared::Result<Assignment> {
        let mut tx = self.state.write_db.begin().await?;
        let previous = find(&mut tx, user_id, date).await?;

        let statement = Query::delete()
            .from_table(UserActivities::Table)
            .and_where(Expr::col(UserActivities::UserId).eq(user_id))
            .and_where(Expr::col(UserActivities::ActivityDate).eq(crate::day_timestamp(date)))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        let exclude = previous.as_ref().map(|a| a.activity.as_str());
        let assignment = self.assign(&mut tx, user_id, date, exclude).await?;
        tx.commit().await?;

        tracing::info!(
            user = user_id,
            previous = ?exclude,
            activity = %assignment.activity,
            "activity re-rolled"
        );

        Ok(assignment)
    }

    /// Every assignment of the visitor, newest first.
    pub async fn history(&self, user_id: i64) -> advent_shared::Result<Vec<Assignment>> {
        let statement = Query::select()
            .columns([UserActivities::Activity, UserActivities::ActivityDate])
            .from(UserActivities::Table)
            .and_where(Expr::col(UserActivities::UserId).eq(user_id))
            .order_by(UserActivities::ActivityDate, Order::Desc)
            .order_by(UserActivities::Id, Order::Desc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, AssignmentRow, _>(&sql, values)
            .fetch_all(&self.state.read_db)
            .await?;

        rows.into_iter().map(Assignment::try_from).collect()
    }

    /// Dates on which the visitor holds an assignment. In the persisted
    /// variant a day counts as done once it has one.
    pub async fn drawn_dates(&self, user_id: i64) -> advent_shared::Result<BTreeSet<Date>> {
        Ok(self
            .history(user_id)
            .await?
            .into_iter()
            .map(|assignment| assignment.date)
            .collect())
    }

    async fn assign(
        &self,
        conn: &mut SqliteConnection,
        user_id: i64,
        date: Date,
        exclude: Option<&str>,
    ) -> advent_shared::Result<Assignment> {
        let statement = Query::select()
            .distinct()
            .column(UserActivities::Activity)
            .from(UserActivities::Table)
            .and_where(Expr::col(UserActivities::UserId).eq(user_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let seen = sqlx::query_as_with::<_, (String,), _>(&sql, values)
            .fetch_all(&mut *conn)
            .await?
            .into_iter()
            .map(|(activity,)| activity)
            .collect::<HashSet<_>>();

        let pool = candidates(self.sequencer, &seen, exclude);
        let Some(activity) = pick(&pool).map(ToOwned::to_owned) else {
            advent_shared::bail!("no activity to draw from");
        };

        let statement = Query::insert()
            .into_table(UserActivities::Table)
            .columns([
                UserActivities::UserId,
                UserActivities::Activity,
                UserActivities::ActivityDate,
                UserActivities::CreatedAt,
            ])
            .values_panic([
                user_id.into(),
                activity.to_owned().into(),
                crate::day_timestamp(date).into(),
                crate::now_timestamp().into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *conn).await?;

        Ok(Assignment { activity, date })
    }
}

async fn find(
    conn: &mut SqliteConnection,
    user_id: i64,
    date: Date,
) -> advent_shared::Result<Option<Assignment>> {
    let statement = Query::select()
        .columns([UserActivities::Activity, UserActivities::ActivityDate])
        .from(UserActivities::Table)
        .and_where(Expr::col(UserActivities::UserId).eq(user_id))
        .and_where(Expr::col(UserActivities::ActivityDate).eq(crate::day_timestamp(date)))
        .order_by(UserActivities::Id, Order::Desc)
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, AssignmentRow, _>(&sql, values)
        .fetch_optional(conn)
        .await?;

    row.map(Assignment::try_from).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn sequencer(activities: &[&str]) -> Sequencer {
        Sequencer::new(date!(2024 - 12 - 01), activities.iter().copied()).unwrap()
    }

    fn seen(texts: &[&str]) -> HashSet<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_candidates_skip_seen_activities() {
        let sequencer = sequencer(&["Cocoa", "Carol", "Cookies"]);
        let pool = candidates(&sequencer, &seen(&["Carol"]), None);

        assert_eq!(pool, vec!["Cocoa", "Cookies"]);
    }

    #[test]
    fn test_candidates_reset_when_everything_seen() {
        let sequencer = sequencer(&["Cocoa", "Carol"]);
        let pool = candidates(&sequencer, &seen(&["Cocoa", "Carol"]), None);

        assert_eq!(pool, vec!["Cocoa", "Carol"]);
    }

    #[test]
    fn test_candidates_exclude_replaced_activity() {
        let sequencer = sequencer(&["Cocoa", "Carol"]);

        let pool = candidates(&sequencer, &seen(&["Cocoa", "Carol"]), Some("Carol"));
        assert_eq!(pool, vec!["Cocoa"]);

        let pool = candidates(&sequencer, &seen(&[]), Some("Cocoa"));
        assert_eq!(pool, vec!["Carol"]);
    }

    #[test]
    fn test_candidates_single_activity_keeps_excluded() {
        let sequencer = sequencer(&["Cocoa"]);
        let pool = candidates(&sequencer, &seen(&["Cocoa"]), Some("Cocoa"));

        assert_eq!(pool, vec!["Cocoa"]);
    }

    #[test]
    fn test_candidates_deduplicate_texts() {
        let sequencer = sequencer(&["Cocoa", "Carol", "Cocoa"]);
        let pool = candidates(&sequencer, &seen(&[]), None);

        assert_eq!(pool, vec!["Cocoa", "Carol"]);
    }

    #[test]
    fn test_pick_stays_in_pool() {
        let pool = vec!["Cocoa", "Carol", "Cookies"];

        for _ in 0..50 {
            let picked = pick(&pool).unwrap();
            assert!(pool.contains(&picked));
        }

        assert!(pick(&[]).is_none());
    }
}
