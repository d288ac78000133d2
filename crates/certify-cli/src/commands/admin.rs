use serde_json::{Map, Value, json};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AdminCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `certify admin`.
pub async fn handle(action: &AdminCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        AdminCommands::Folders => {
            let mut folders = Map::new();
            for (folder, path) in ctx.service.admin_folders().await? {
                folders.insert(folder.column().to_string(), path.map_or(Value::Null, Value::String));
            }
            output(&Value::Object(folders), flags.format)
        }
        AdminCommands::Impersonate { user_id } => {
            let name = ctx.service.user_full_name(*user_id).await?;
            let Some(name) = name else {
                anyhow::bail!("user {user_id} not found");
            };
            ctx.service.set_impersonate_id(*user_id).await?;
            output(&json!({ "impersonating": user_id, "full_name": name }), flags.format)
        }
        AdminCommands::ClearImpersonation => {
            ctx.service.clear_impersonate_id().await?;
            output(&json!({ "impersonating": null }), flags.format)
        }
    }
}
