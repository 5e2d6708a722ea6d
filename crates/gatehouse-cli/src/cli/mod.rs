//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use gatehouse_core::{config, logging};

mod commands;

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(version)]
#[command(about = "Terminal account portal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Start path for the portal (e.g. /login, /home/profile)
    #[arg(long, value_name = "PATH")]
    path: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password (prefer the env var over the flag)
        #[arg(long, env = "GATEHOUSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Send a password recovery link
    Recover {
        /// Account email
        #[arg(long)]
        email: String,
    },

    /// Inspect or edit the signed-in profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    /// Print the profile as JSON
    Show,
    /// Update profile fields
    Set {
        /// New first name
        #[arg(long)]
        firstname: Option<String>,
        /// New last name
        #[arg(long)]
        lastname: Option<String>,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Set backend connection values in the config file
    Set {
        /// Backend base URL
        #[arg(long)]
        url: Option<String>,
        /// Publishable API key
        #[arg(long = "anon-key")]
        anon_key: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    // Config commands work without backend settings and skip the log file.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Set { url, anon_key } => {
                commands::config::set(url.as_deref(), anon_key.as_deref())
            }
        };
    }

    let config = config::Config::load().context("load config")?;
    let _guard = logging::init(config.log_filter.as_deref()).context("init logging")?;

    match cli.command {
        // Config was handled above; falling through here cannot happen.
        None | Some(Commands::Config { .. }) => {
            commands::portal::run(&config, cli.path.as_deref()).await
        }
        Some(Commands::Login { email, password }) => {
            commands::auth::login(&config, &email, &password).await
        }
        Some(Commands::Logout) => commands::auth::logout(&config).await,
        Some(Commands::Whoami) => commands::auth::whoami(&config).await,
        Some(Commands::Recover { email }) => commands::auth::recover(&config, &email).await,
        Some(Commands::Profile { command }) => match command {
            ProfileCommands::Show => commands::profile::show(&config).await,
            ProfileCommands::Set {
                firstname,
                lastname,
            } => commands::profile::set(&config, firstname, lastname).await,
        },
    }
}
