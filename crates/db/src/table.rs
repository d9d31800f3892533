use sea_query::Iden;

#[derive(Iden, Clone)]
pub enum User {
    Table,
    Id,
    Username,
    Email,
    Password,
    FirstName,
    LastName,
    Role,
    Status,
    CreatedAt,
}
