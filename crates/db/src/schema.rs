use sea_query::{ColumnDef, Index, IndexCreateStatement, SqliteQueryBuilder, Table, TableCreateStatement};
use sqlx::SqlitePool;

use crate::table::User;

fn create_user_table_statement() -> TableCreateStatement {
    Table::create()
        .table(User::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(User::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(User::Username)
                .string()
                .string_len(150)
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(User::Email)
                .string()
                .string_len(254)
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(User::Password).string().not_null())
        .col(
            ColumnDef::new(User::FirstName)
                .string()
                .string_len(30)
                .not_null()
                .default(""),
        )
        .col(
            ColumnDef::new(User::LastName)
                .string()
                .string_len(30)
                .not_null()
                .default(""),
        )
        .col(
            ColumnDef::new(User::Role)
                .string()
                .string_len(10)
                .not_null(),
        )
        .col(
            ColumnDef::new(User::Status)
                .string()
                .string_len(8)
                .not_null(),
        )
        .col(ColumnDef::new(User::CreatedAt).big_integer().not_null())
        .to_owned()
}

fn create_user_role_idx_statement() -> IndexCreateStatement {
    Index::create()
        .if_not_exists()
        .name("idx_user_role")
        .table(User::Table)
        .col(User::Role)
        .to_owned()
}

/// Create the principal schema when it does not exist yet.
pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    let statement = create_user_table_statement().to_string(SqliteQueryBuilder);
    sqlx::query(&statement).execute(pool).await?;

    let statement = create_user_role_idx_statement().to_string(SqliteQueryBuilder);
    sqlx::query(&statement).execute(pool).await?;

    tracing::info!("User schema ready");

    Ok(())
}
