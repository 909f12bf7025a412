use std::collections::BTreeSet;

use advent_db::table::UserCompletions;
use advent_shared::State;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

use crate::{CompletionState, CompletionStore, visitor};

/// Completion rows in `user_completions`, keyed by the visitor's session token.
#[derive(Clone)]
pub struct DatabaseStore(pub State);

impl DatabaseStore {
    async fn positions<'e>(
        executor: impl sqlx::SqliteExecutor<'e>,
        user_id: i64,
    ) -> advent_shared::Result<BTreeSet<usize>> {
        let statement = Query::select()
            .column(UserCompletions::Position)
            .from(UserCompletions::Table)
            .and_where(Expr::col(UserCompletions::UserId).eq(user_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_all(executor)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(position,)| usize::try_from(position).ok())
            .collect())
    }
}

#[async_trait::async_trait]
impl CompletionStore for DatabaseStore {
    async fn get(&self, identity: &str) -> advent_shared::Result<CompletionState> {
        let Some(user_id) = visitor::find(&self.0.read_db, identity).await? else {
            return Ok(CompletionState::default());
        };

        let positions = Self::positions(&self.0.read_db, user_id).await?;

        Ok(positions.into_iter().collect())
    }

    async fn toggle(&self, identity: &str, position: usize) -> advent_shared::Result<bool> {
        let user_id = visitor::ensure(&self.0.write_db, identity).await?;
        let position = position as i64;
        let mut tx = self.0.write_db.begin().await?;

        let statement = Query::select()
            .column(UserCompletions::Position)
            .from(UserCompletions::Table)
            .and_where(Expr::col(UserCompletions::UserId).eq(user_id))
            .and_where(Expr::col(UserCompletions::Position).eq(position))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let existing = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_optional(&mut *tx)
            .await?;

        let (sql, values) = match existing {
            Some(_) => Query::delete()
                .from_table(UserCompletions::Table)
                .and_where(Expr::col(UserCompletions::UserId).eq(user_id))
                .and_where(Expr::col(UserCompletions::Position).eq(position))
                .to_owned()
                .build_sqlx(SqliteQueryBuilder),
            None => Query::insert()
                .into_table(UserCompletions::Table)
                .columns([
                    UserCompletions::UserId,
                    UserCompletions::Position,
                    UserCompletions::CreatedAt,
                ])
                .values_panic([user_id.into(), position.into(), crate::now_timestamp().into()])
                .to_owned()
                .build_sqlx(SqliteQueryBuilder),
        };

        sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(existing.is_none())
    }
}
