use serde_json::json;

use certify_core::enums::StatusType;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StatusArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `certify status`.
pub async fn handle(args: &StatusArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    if let Some(name) = &args.status_type {
        let status_type: StatusType = name.parse()?;
        return output(&ctx.service.status(status_type).await?, flags.format);
    }
    let statuses = if args.all {
        ctx.service.statuses().await?
    } else {
        ctx.service.active_statuses().await?
    };
    output(&statuses, flags.format)
}

/// Handle `certify migrate`. Opening the database already ran migrations.
pub fn migrated(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    tracing::info!(path = %ctx.config.database.path, "schema up to date");
    output(
        &json!({ "database": ctx.config.database.path, "migrated": true }),
        flags.format,
    )
}
