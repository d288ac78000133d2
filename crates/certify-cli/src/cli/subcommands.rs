use clap::{Args, Subcommand};

/// User administration.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user with the web role.
    Add(UserAddArgs),
    /// Show a user and the roles their token would carry.
    Get { user_id: i64 },
    /// Restore the temporary password.
    ResetPassword { user_id: i64 },
    /// Set a new password under a fresh salt.
    SetPassword(SetPasswordArgs),
    /// Give a role (web, auditor, staff).
    GrantRole(RoleArgs),
    /// Remove a role (web, auditor, staff).
    RevokeRole(RoleArgs),
    /// Clear a web lockout.
    Unlock { user_id: i64 },
    /// Mark a web account confirmed.
    Confirm { user_id: i64 },
}

#[derive(Clone, Debug, Args)]
pub struct UserAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    /// Initial password; the temporary password is used when omitted.
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub admin: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SetPasswordArgs {
    pub user_id: i64,
    #[arg(long)]
    pub password: String,
}

#[derive(Clone, Debug, Args)]
pub struct RoleArgs {
    pub user_id: i64,
    pub role: String,
}

/// Admin row settings.
#[derive(Clone, Debug, Subcommand)]
pub enum AdminCommands {
    /// Folder settings as seen from this machine.
    Folders,
    /// Act as another user in the desktop client.
    Impersonate { user_id: i64 },
    /// Stop impersonating.
    ClearImpersonation,
}

/// Log table queries.
#[derive(Clone, Debug, Subcommand)]
pub enum LogCommands {
    /// Count error entries since a time (default: 24 hours ago).
    Errors {
        /// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
        #[arg(long)]
        since: Option<String>,
    },
    /// Most recent entries.
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

/// Configuration helpers.
#[derive(Clone, Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the merged configuration as TOML, signing key masked.
    Show,
    /// Print a random value for `auth.signing_key`.
    SigningKey,
}
