//! Persisted visitors, keyed by their session token.

use advent_db::table::Users;
use sea_query::{Expr, ExprTrait, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;

pub async fn find(pool: &SqlitePool, session_id: &str) -> advent_shared::Result<Option<i64>> {
    let statement = Query::select()
        .column(Users::Id)
        .from(Users::Table)
        .and_where(Expr::col(Users::SessionId).eq(session_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(id,)| id))
}

/// Returns the visitor id, creating the row on first use.
pub async fn ensure(pool: &SqlitePool, session_id: &str) -> advent_shared::Result<i64> {
    let statement = Query::insert()
        .into_table(Users::Table)
        .columns([Users::SessionId, Users::CreatedAt])
        .values_panic([session_id.into(), crate::now_timestamp().into()])
        .on_conflict(OnConflict::column(Users::SessionId).do_nothing().to_owned())
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    if result.rows_affected() > 0 {
        tracing::info!(session = session_id, "visitor created");
    }

    match find(pool, session_id).await? {
        Some(id) => Ok(id),
        None => Err(advent_shared::Error::NotFound),
    }
}
