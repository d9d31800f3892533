use std::sync::OnceLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::query::UserView;
use crate::repository::{self, FindType};

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Hash used to keep the unknown-username path as slow as the wrong-password path.
fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(b"imbds-unknown-principal", &salt)
                .map(|hash| hash.to_string())
                .ok()
        })
        .as_deref()
}

fn verify(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::warn!("stored password is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

impl super::Command {
    /// Resolve a principal from a username and password.
    ///
    /// Unknown usernames, archived principals and wrong passwords all yield
    /// `Ok(None)` so callers cannot tell them apart.
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> imbds_shared::Result<Option<UserView>> {
        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }

        let Some(user_row) =
            repository::find(&self.read_db, FindType::Username(username.to_owned())).await?
        else {
            if let Some(hash) = dummy_hash() {
                verify(password, hash);
            }

            return Ok(None);
        };

        if !verify(password, &user_row.password) {
            return Ok(None);
        }

        if !user_row.status.0.can_login() {
            tracing::info!(principal_id = user_row.id, "archived principal attempted login");
            return Ok(None);
        }

        Ok(Some(user_row.into()))
    }
}
