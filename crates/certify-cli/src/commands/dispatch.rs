use certify_config::CertifyConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
///
/// `serve` and `config` run before any database is opened.
pub async fn dispatch(command: Commands, config: CertifyConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Serve(args) => commands::serve::handle(&args, config).await,
        Commands::Config { action } => commands::config::handle(&action, &config, flags),
        Commands::Migrate => {
            let ctx = AppContext::init(config).await?;
            commands::status::migrated(&ctx, flags)
        }
        Commands::Status(args) => {
            let ctx = AppContext::init(config).await?;
            commands::status::handle(&args, &ctx, flags).await
        }
        Commands::User { action } => {
            let ctx = AppContext::init(config).await?;
            commands::user::handle(&action, &ctx, flags).await
        }
        Commands::Admin { action } => {
            let ctx = AppContext::init(config).await?;
            commands::admin::handle(&action, &ctx, flags).await
        }
        Commands::Log { action } => {
            let ctx = AppContext::init(config).await?;
            commands::log::handle(&action, &ctx, flags).await
        }
    }
}
