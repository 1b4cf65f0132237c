//! Confluence connection flags shared by remote commands.

use std::path::PathBuf;

use clap::Args;
use mdsync_config::{CliSettings, Config, ConfluenceConfig};
use mdsync_confluence::ConfluenceClient;
use tracing::debug;

use crate::error::CliError;
use crate::output::Output;

/// Connection settings; each flag overrides `mdsync.toml`.
#[derive(Args, Debug, Default)]
pub(crate) struct ConnectionArgs {
    /// Confluence base URL.
    #[arg(long = "url", env = "KMS_URL")]
    pub(crate) base_url: Option<String>,

    /// Confluence username.
    #[arg(long, env = "KMS_USERNAME")]
    pub(crate) username: Option<String>,

    /// Confluence password or access token.
    #[arg(long, env = "KMS_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,

    /// Space key for new pages and searches.
    #[arg(long = "space", env = "KMS_SPACE")]
    pub(crate) space_key: Option<String>,

    /// Path to configuration file (default: auto-discover mdsync.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// CLI overrides for [`Config::load`].
    pub(crate) fn settings(&self) -> CliSettings {
        CliSettings {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            space_key: self.space_key.clone(),
            ..Default::default()
        }
    }

    /// Load `mdsync.toml` (explicit or discovered) with `settings` applied.
    pub(crate) fn load_config(&self, settings: &CliSettings) -> Result<Config, CliError> {
        let config = Config::load(self.config.as_deref(), Some(settings))?;
        match &config.config_path {
            Some(path) => debug!("Using config {}", path.display()),
            None => debug!("No mdsync.toml found, using defaults"),
        }
        Ok(config)
    }
}

/// Validated Confluence section, with a hint on what to configure.
pub(crate) fn require_confluence_config<'a>(
    config: &'a Config,
    output: &Output,
) -> Result<&'a ConfluenceConfig, CliError> {
    config.require_confluence().map_err(|err| {
        output.info("\nConfigure Confluence in mdsync.toml:");
        output.info("\n[confluence]");
        output.info(r#"base_url = "https://kms.example.com""#);
        output.info(r#"username = "${KMS_USERNAME}""#);
        output.info(r#"password = "${KMS_PASSWORD}""#);
        output.info(r#"space_key = "DOC""#);
        output.info("\nor pass --url/--username/--password (KMS_URL, KMS_USERNAME, KMS_PASSWORD).");
        err.into()
    })
}

pub(crate) fn create_confluence_client(
    conf_config: &ConfluenceConfig,
) -> Result<ConfluenceClient, CliError> {
    let client = ConfluenceClient::from_config(
        &conf_config.base_url,
        &conf_config.username,
        &conf_config.password,
    )?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_carry_overrides() {
        let args = ConnectionArgs {
            base_url: Some("https://kms".to_owned()),
            space_key: Some("DOC".to_owned()),
            ..Default::default()
        };
        let settings = args.settings();
        assert_eq!(settings.base_url.as_deref(), Some("https://kms"));
        assert_eq!(settings.space_key.as_deref(), Some("DOC"));
        assert!(settings.username.is_none());
        assert!(settings.parent_page_id.is_none());
    }
}
