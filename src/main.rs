use anyhow::Result;
use clap::{Parser, Subcommand};
use imbds::cli::user::Role;

/// imbds - business and investible map data service
#[derive(Parser)]
#[command(name = "imbds")]
#[command(about = "Business and investible map data service", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Manage principals
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a principal
    Create {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, value_enum, default_value_t = Role::Employee)]
        role: Role,
    },
    /// Change the role of an existing principal
    SetRole {
        #[arg(long)]
        username: String,

        #[arg(long, value_enum)]
        role: Role,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = imbds::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    // Initialize observability (tracing + logging)
    imbds::observability::init_observability(
        "imbds",
        env!("CARGO_PKG_VERSION"),
        &config.logging.level,
        &config.logging.format,
    )?;

    match cli.command {
        Commands::Serve { host, port } => imbds::cli::server::serve(config, host, port).await,
        Commands::Migrate => imbds::cli::migrate(&config).await,
        Commands::User { command } => match command {
            UserCommands::Create {
                username,
                email,
                password,
                role,
            } => imbds::cli::user::create(config, username, email, password, role).await,
            UserCommands::SetRole { username, role } => {
                imbds::cli::user::set_role(config, username, role).await
            }
        },
    }
}
