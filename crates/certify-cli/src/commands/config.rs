use serde_json::json;

use certify_config::CertifyConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ConfigCommands;
use crate::output::output;

const MASK: &str = "********";

/// Handle `certify config`.
pub fn handle(action: &ConfigCommands, config: &CertifyConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", render_masked(config)?);
            Ok(())
        }
        ConfigCommands::SigningKey => {
            let key = certify_auth::generate_signing_key()?;
            output(&json!({ "signing_key": key }), flags.format)
        }
    }
}

fn render_masked(config: &CertifyConfig) -> anyhow::Result<String> {
    let mut shown = config.clone();
    if shown.auth.is_configured() {
        shown.auth.signing_key = MASK.to_string();
    }
    Ok(toml::to_string_pretty(&shown)?)
}
