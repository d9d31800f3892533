use std::path::PathBuf;

use imbds_shared::user::Role;
use imbds_user::{Command, RegisterInput};

pub async fn setup_test_command(path: PathBuf) -> anyhow::Result<Command> {
    let url = format!("sqlite:{}", path.to_str().unwrap());
    let pool = imbds_db::create_pool(&url, 1).await?;
    imbds_db::migrate(&pool).await?;

    Ok(Command::new(pool.clone(), pool))
}

#[allow(dead_code)]
pub async fn create_user(cmd: &Command, name: impl Into<String>, role: Role) -> anyhow::Result<i64> {
    let name = name.into();
    let id = cmd
        .register(RegisterInput {
            username: name.to_owned(),
            email: format!("{name}@imbds.localhost"),
            password: "my_password".to_owned(),
            first_name: "".to_owned(),
            last_name: "".to_owned(),
            role,
        })
        .await?;

    Ok(id)
}
