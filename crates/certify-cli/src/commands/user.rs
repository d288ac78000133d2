use anyhow::bail;
use serde_json::json;

use certify_auth::password::new_credentials;
use certify_core::entities::User;
use certify_core::enums::UserRole;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{UserAddArgs, UserCommands};
use crate::context::AppContext;
use crate::output::output;

/// Handle `certify user`.
pub async fn handle(action: &UserCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let svc = &ctx.service;
    match action {
        UserCommands::Add(args) => add(args, ctx, flags).await,
        UserCommands::Get { user_id } => {
            let user = svc.fetch_user(*user_id).await?;
            let roles = svc.api_roles(*user_id).await?;
            output(&json!({ "user": user, "roles": roles }), flags.format)
        }
        UserCommands::ResetPassword { user_id } => {
            let updated = svc.reset_password(*user_id).await?;
            output(&json!({ "user_id": user_id, "updated": updated }), flags.format)
        }
        UserCommands::SetPassword(args) => {
            if args.password.is_empty() {
                bail!("password cannot be empty");
            }
            let (hash, salt) = new_credentials(&args.password)?;
            let updated = svc.set_password(args.user_id, &hash, &salt).await?;
            output(&json!({ "user_id": args.user_id, "updated": updated }), flags.format)
        }
        UserCommands::GrantRole(args) => {
            let role: UserRole = args.role.parse()?;
            let role_id = svc.create_user_role(args.user_id, role).await?;
            output(
                &json!({ "user_id": args.user_id, "role": role, "role_id": role_id }),
                flags.format,
            )
        }
        UserCommands::RevokeRole(args) => {
            let role: UserRole = args.role.parse()?;
            let revoked = svc.delete_user_role(args.user_id, role).await?;
            output(
                &json!({ "user_id": args.user_id, "role": role, "revoked": revoked }),
                flags.format,
            )
        }
        UserCommands::Unlock { user_id } => {
            let updated = svc.unlock_web_access(*user_id).await?;
            output(&json!({ "user_id": user_id, "updated": updated }), flags.format)
        }
        UserCommands::Confirm { user_id } => {
            let updated = svc.confirm_account(*user_id).await?;
            output(&json!({ "user_id": user_id, "updated": updated }), flags.format)
        }
    }
}

async fn add(args: &UserAddArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut user = User {
        full_name: args.name.clone(),
        email: args.email.clone(),
        is_admin: args.admin,
        ..User::default()
    };
    if let Some(password) = &args.password {
        let (hash, salt) = new_credentials(password)?;
        user.password = hash;
        user.password_salt = salt;
    }
    if ctx.service.email_exists(&user.email).await? {
        bail!("a user with email {} already exists", user.email);
    }
    let user_id = ctx.service.save_user(&user).await?;
    output(&json!({ "user_id": user_id }), flags.format)
}
