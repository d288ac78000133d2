use anyhow::Context;

use certify_config::CertifyConfig;

use crate::cli::root_commands::ServeArgs;

/// Handle `certify serve`.
pub async fn handle(args: &ServeArgs, mut config: CertifyConfig) -> anyhow::Result<()> {
    if let Some(bind) = &args.bind {
        config.server.bind.clone_from(bind);
    }
    if !config.auth.is_configured() {
        anyhow::bail!(
            "auth.signing_key is not configured; set CERTIFY_AUTH__SIGNING_KEY (see `certify config signing-key`)"
        );
    }
    certify_api::serve(&config)
        .await
        .with_context(|| format!("api server on {} stopped", config.server.bind))
}
