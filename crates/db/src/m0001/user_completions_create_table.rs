use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::{UserCompletions, Users};

pub struct Operation;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(UserCompletions::Table)
        .col(
            ColumnDef::new(UserCompletions::UserId)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(UserCompletions::Position)
                .integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(UserCompletions::CreatedAt)
                .big_integer()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(UserCompletions::UserId)
                .col(UserCompletions::Position),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_user_completions_user_id")
                .from(UserCompletions::Table, UserCompletions::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(UserCompletions::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for Operation {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
