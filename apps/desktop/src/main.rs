use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{
    build_composer, default_config_dir, load_settings, resolve_credentials, AppSettings,
    FileCredentialStore, StoreConnection,
};
use realtime_store::InMemoryStatusStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;
mod display;
mod input;
mod manager;
mod render;
mod setup;

use cli::{Cli, Command, ManagerArgs};
use input::Prompter;

/// Logs go to stderr so the screens on stdout stay clean. Precedence:
/// `--log-level`, then `RUST_LOG`, then the settings file.
fn init_tracing(flag: Option<&str>, configured: &str) {
    let filter = match flag {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_connection(
    offline: bool,
    settings: &AppSettings,
    credentials: &FileCredentialStore,
) -> StoreConnection {
    if offline {
        info!("store: offline mode, using in-memory store");
        return StoreConnection::with_store(Arc::new(InMemoryStatusStore::new()));
    }

    let connection = StoreConnection::firebase(settings.status_path.clone());
    if let Err(err) = connection.connect(&resolve_credentials(credentials)).await {
        warn!("store: not connected, run `mudir setup` to fix the credentials: {err}");
    }
    connection
}

enum Role {
    Manager,
    Display,
}

async fn choose_role() -> Result<Option<Role>> {
    let mut prompter = Prompter::new();
    println!("{}", render::role_menu());
    while let Some(answer) = prompter.line("> ").await? {
        match answer.to_ascii_lowercase().as_str() {
            "1" | "manager" => return Ok(Some(Role::Manager)),
            "2" | "display" => return Ok(Some(Role::Display)),
            _ => println!("{}", render::notice("1 / 2")),
        }
    }
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);
    let settings = load_settings(&config_dir);
    init_tracing(cli.log_level.as_deref(), &settings.log_filter);

    let credentials = FileCredentialStore::in_dir(&config_dir);
    let connection = Arc::new(open_connection(cli.offline, &settings, &credentials).await);
    info!(config_dir = %config_dir.display(), offline = cli.offline, "mudir: starting");

    match cli.command.unwrap_or(Command::Select) {
        Command::Setup(args) => setup::run(args, &credentials, &connection).await,
        Command::Display => display::run(connection).await,
        Command::Manager(args) => {
            manager::run(connection, build_composer(&settings), args).await
        }
        Command::Select => match choose_role().await? {
            Some(Role::Manager) => {
                manager::run(connection, build_composer(&settings), ManagerArgs::default()).await
            }
            Some(Role::Display) => display::run(connection).await,
            None => Ok(()),
        },
    }
}
