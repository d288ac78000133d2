use clap::{Args, Subcommand};

use crate::cli::subcommands::{AdminCommands, ConfigCommands, LogCommands, UserCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the REST API.
    Serve(ServeArgs),
    /// Create or upgrade the database schema.
    Migrate,
    /// Dashboard status counts.
    Status(StatusArgs),
    /// User accounts and roles.
    User {
        #[command(subcommand)]
        action: UserCommands,
    },
    /// Admin settings.
    Admin {
        #[command(subcommand)]
        action: AdminCommands,
    },
    /// Application log.
    Log {
        #[command(subcommand)]
        action: LogCommands,
    },
    /// Effective configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Listen address, overriding `server.bind`.
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct StatusArgs {
    /// One status by name (e.g. OVERDUE_CAR) or position.
    #[arg(long = "type")]
    pub status_type: Option<String>,

    /// Include statuses with a zero count.
    #[arg(long)]
    pub all: bool,
}
