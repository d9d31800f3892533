use clap::ValueEnum;
use imbds_user::{RegisterInput, UpdateInput};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Role {
    Admin,
    Employee,
}

impl From<Role> for imbds_shared::user::Role {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => imbds_shared::user::Role::Admin,
            Role::Employee => imbds_shared::user::Role::Employee,
        }
    }
}

async fn command(config: &crate::config::Config) -> anyhow::Result<imbds_user::Command> {
    let pool = imbds_db::create_pool(&config.database.url, 1).await?;
    imbds_db::migrate(&pool).await?;

    Ok(imbds_user::Command::new(pool.clone(), pool))
}

pub async fn create(
    config: crate::config::Config,
    username: String,
    email: String,
    password: String,
    role: Role,
) -> anyhow::Result<()> {
    let command = command(&config).await?;

    let id = command
        .register(RegisterInput {
            username: username.to_owned(),
            email,
            password,
            first_name: String::new(),
            last_name: String::new(),
            role: role.into(),
        })
        .await?;

    tracing::info!(principal_id = id, "{username} created");

    Ok(())
}

pub async fn set_role(
    config: crate::config::Config,
    username: String,
    role: Role,
) -> anyhow::Result<()> {
    let command = command(&config).await?;

    let Some(user) = command.find_by_username(&username).await? else {
        anyhow::bail!("user {username} not found");
    };

    let role: imbds_shared::user::Role = role.into();
    command
        .update(
            user.user_id,
            UpdateInput {
                role: Some(role),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!("{username} is now {role}");

    Ok(())
}
