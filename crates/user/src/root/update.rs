use imbds_db::table::User;
use imbds_shared::user::{Role, Status};
use validator::Validate;

use crate::query::UserView;
use crate::repository::{self, FindType};

#[derive(Validate, Default)]
pub struct UpdateInput {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 30))]
    pub first_name: Option<String>,
    #[validate(length(max = 30))]
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
}

impl UpdateInput {
    /// Whether applying the input to `current` would change a field only an
    /// Admin may change. Restating the current role or status is not a change.
    pub fn changes_privileges(&self, current: &UserView) -> bool {
        self.role.is_some_and(|role| role != current.user_role)
            || self.status.is_some_and(|status| status != current.user_status)
    }
}

#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    Unchanged(UserView),
    Updated(UserView),
}

impl super::Command {
    pub async fn update(&self, id: i64, input: UpdateInput) -> imbds_shared::Result<UpdateOutcome> {
        input.validate()?;

        let Some(current) = repository::find(&self.read_db, FindType::Id(id)).await? else {
            imbds_shared::not_found!("User");
        };

        let username = input.username.filter(|v| *v != current.username);
        let email = input.email.filter(|v| *v != current.email);
        let first_name = input.first_name.filter(|v| *v != current.first_name);
        let last_name = input.last_name.filter(|v| *v != current.last_name);
        let role = input.role.filter(|v| *v != current.role.0);
        let status = input.status.filter(|v| *v != current.status.0);

        if username.is_none()
            && email.is_none()
            && input.password.is_none()
            && first_name.is_none()
            && last_name.is_none()
            && role.is_none()
            && status.is_none()
        {
            return Ok(UpdateOutcome::Unchanged(current.into()));
        }

        if let Some(username) = &username {
            if repository::is_taken(&self.read_db, User::Username, username, Some(id)).await? {
                imbds_shared::conflict!("Username already exists");
            }
        }

        if let Some(email) = &email {
            if repository::is_taken(&self.read_db, User::Email, email, Some(id)).await? {
                imbds_shared::conflict!("Email already exists");
            }
        }

        let password = match input.password {
            Some(password) => Some(super::register::hash_password(&password)?),
            None => None,
        };

        repository::update(
            &self.write_db,
            id,
            repository::UpdateInput {
                username,
                email,
                password,
                first_name,
                last_name,
                role,
                status,
            },
        )
        .await?;

        let Some(updated) = repository::find(&self.write_db, FindType::Id(id)).await? else {
            imbds_shared::bail!("user {id} vanished during update");
        };

        tracing::info!(principal_id = id, "principal updated");

        Ok(UpdateOutcome::Updated(updated.into()))
    }
}
