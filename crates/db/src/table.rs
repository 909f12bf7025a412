use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum Users {
    Table,
    Id,
    SessionId,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum UserActivities {
    Table,
    Id,
    UserId,
    Activity,
    ActivityDate,
    CreatedAt,
}

#[derive(Iden, Clone)]
pub enum UserCompletions {
    Table,
    UserId,
    Position,
    CreatedAt,
}
