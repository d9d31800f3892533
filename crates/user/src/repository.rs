use imbds_db::table::User;
use imbds_shared::user::{Role, Status};
use sea_query::{Expr, ExprTrait, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};
use time::OffsetDateTime;

#[derive(FromRow, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: sqlx::types::Text<Role>,
    pub status: sqlx::types::Text<Status>,
    pub created_at: i64,
}

pub enum FindType {
    Id(i64),
    Username(String),
}

fn select_statement() -> SelectStatement {
    Query::select()
        .columns([
            User::Id,
            User::Username,
            User::Email,
            User::Password,
            User::FirstName,
            User::LastName,
            User::Role,
            User::Status,
            User::CreatedAt,
        ])
        .from(User::Table)
        .to_owned()
}

pub(crate) async fn find(
    pool: &SqlitePool,
    arg_type: FindType,
) -> imbds_shared::Result<Option<UserRow>> {
    let mut statement = select_statement().limit(1).to_owned();

    match arg_type {
        FindType::Id(id) => statement.and_where(Expr::col(User::Id).eq(id)),
        FindType::Username(username) => statement.and_where(Expr::col(User::Username).eq(username)),
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) async fn list(pool: &SqlitePool) -> imbds_shared::Result<Vec<UserRow>> {
    let statement = select_statement()
        .order_by(User::Id, Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) struct CreateInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub status: Status,
}

pub(crate) async fn create(pool: &SqlitePool, input: CreateInput) -> imbds_shared::Result<i64> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let statement = Query::insert()
        .into_table(User::Table)
        .columns([
            User::Username,
            User::Email,
            User::Password,
            User::FirstName,
            User::LastName,
            User::Role,
            User::Status,
            User::CreatedAt,
        ])
        .values_panic([
            input.username.into(),
            input.email.into(),
            input.password.into(),
            input.first_name.into(),
            input.last_name.into(),
            input.role.to_string().into(),
            input.status.to_string().into(),
            now.into(),
        ])
        .returning_col(User::Id)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    let (id,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_one(pool)
        .await
        .map_err(unique_violation)?;

    Ok(id)
}

#[derive(Default)]
pub(crate) struct UpdateInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
}

pub(crate) async fn update(
    pool: &SqlitePool,
    id: i64,
    input: UpdateInput,
) -> imbds_shared::Result<()> {
    let mut statement = Query::update()
        .table(User::Table)
        .and_where(Expr::col(User::Id).eq(id))
        .to_owned();

    if let Some(username) = input.username {
        statement.value(User::Username, username);
    }

    if let Some(email) = input.email {
        statement.value(User::Email, email);
    }

    if let Some(password) = input.password {
        statement.value(User::Password, password);
    }

    if let Some(first_name) = input.first_name {
        statement.value(User::FirstName, first_name);
    }

    if let Some(last_name) = input.last_name {
        statement.value(User::LastName, last_name);
    }

    if let Some(role) = input.role {
        statement.value(User::Role, role.as_ref());
    }

    if let Some(status) = input.status {
        statement.value(User::Status, status.to_string());
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values)
        .execute(pool)
        .await
        .map_err(unique_violation)?;

    Ok(())
}

/// Whether another principal already holds the username or email.
pub(crate) async fn is_taken(
    pool: &SqlitePool,
    column: User,
    value: impl Into<String>,
    except: Option<i64>,
) -> imbds_shared::Result<bool> {
    let mut statement = Query::select()
        .column(User::Id)
        .from(User::Table)
        .and_where(Expr::col(column).eq(value.into()))
        .to_owned();

    if let Some(id) = except {
        statement.and_where(Expr::col(User::Id).ne(id));
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

fn unique_violation(err: sqlx::Error) -> imbds_shared::Error {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            imbds_shared::Error::Conflict("Username or email already exists".to_owned())
        }
        _ => err.into(),
    }
}
