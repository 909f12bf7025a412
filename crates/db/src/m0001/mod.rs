mod user_activities_create_table;
mod user_activities_create_user_date_idx;
mod user_completions_create_table;
mod users_create_table;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "advent",
    "m0001",
    vec_box![],
    vec_box![
        users_create_table::Operation,
        user_activities_create_table::Operation,
        user_activities_create_user_date_idx::Operation,
        user_completions_create_table::Operation
    ]
);
