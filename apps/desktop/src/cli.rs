use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::OfficeStatus;

#[derive(Parser, Debug)]
#[command(name = "mudir", version, about = "Office status board: manager control and passive display")]
pub struct Cli {
    /// Use an in-memory store instead of the realtime database.
    #[arg(long, global = true)]
    pub offline: bool,
    /// Directory holding mudir.toml and credentials.toml.
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
    /// Log filter, e.g. `debug` or `client_core=trace`. Overrides RUST_LOG.
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Choose between the manager and display roles.
    Select,
    /// Manager control screen.
    Manager(ManagerArgs),
    /// Passive status display.
    Display,
    /// Enter and save realtime database credentials.
    Setup(SetupArgs),
}

#[derive(Args, Debug, Default)]
pub struct ManagerArgs {
    /// Change the status once and exit: available, busy, prayer or closed.
    #[arg(long, value_name = "STATUS", value_parser = parse_status)]
    pub set: Option<OfficeStatus>,
    /// Context handed to message generation together with --set.
    #[arg(long, value_name = "TEXT", requires = "set")]
    pub context: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct SetupArgs {
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub project_id: Option<String>,
    #[arg(long)]
    pub database_url: Option<String>,
    #[arg(long)]
    pub auth_domain: Option<String>,
    #[arg(long)]
    pub app_id: Option<String>,
    /// Database secret or ID token sent as `?auth=`.
    #[arg(long)]
    pub auth_token: Option<String>,
}

impl SetupArgs {
    /// Both mandatory values were given on the command line.
    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.project_id.is_some()
    }
}

fn parse_status(raw: &str) -> Result<OfficeStatus, String> {
    raw.parse().map_err(|err: shared::RecordError| err.to_string())
}
