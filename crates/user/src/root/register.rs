use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use imbds_db::table::User;
use imbds_shared::user::{Role, Status};
use validator::Validate;

use crate::repository;

#[derive(Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 30))]
    pub first_name: String,
    #[validate(length(max = 30))]
    pub last_name: String,
    pub role: Role,
}

pub(crate) fn hash_password(password: &str) -> imbds_shared::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

impl super::Command {
    pub async fn register(&self, input: RegisterInput) -> imbds_shared::Result<i64> {
        input.validate()?;

        if repository::is_taken(&self.read_db, User::Username, &input.username, None).await? {
            imbds_shared::conflict!("Username already exists");
        }

        if repository::is_taken(&self.read_db, User::Email, &input.email, None).await? {
            imbds_shared::conflict!("Email already exists");
        }

        let password = hash_password(&input.password)?;

        let id = repository::create(
            &self.write_db,
            repository::CreateInput {
                username: input.username,
                email: input.email,
                password,
                first_name: input.first_name,
                last_name: input.last_name,
                role: input.role,
                status: Status::Online,
            },
        )
        .await?;

        tracing::info!(principal_id = id, role = %input.role, "principal registered");

        Ok(id)
    }
}
