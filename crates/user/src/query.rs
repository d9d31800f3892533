use imbds_shared::user::{Role, Status};
use serde::Serialize;

use crate::repository::{self, FindType, UserRow};

/// Public projection of a principal. The password hash never leaves the crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_role: Role,
    pub user_status: Status,
}

impl From<UserRow> for UserView {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            username: row.username,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            user_role: row.role.0,
            user_status: row.status.0,
        }
    }
}

impl super::Command {
    pub async fn find(&self, id: i64) -> imbds_shared::Result<Option<UserView>> {
        let row = repository::find(&self.read_db, FindType::Id(id)).await?;

        Ok(row.map(UserView::from))
    }

    pub async fn find_by_username(
        &self,
        username: impl Into<String>,
    ) -> imbds_shared::Result<Option<UserView>> {
        let row = repository::find(&self.read_db, FindType::Username(username.into())).await?;

        Ok(row.map(UserView::from))
    }

    pub async fn list(&self) -> imbds_shared::Result<Vec<UserView>> {
        let rows = repository::list(&self.read_db).await?;

        Ok(rows.into_iter().map(UserView::from).collect())
    }
}
