use std::sync::Arc;

use elogie_core::config::{AppConfig, ConfigError};
use elogie_slack::{
    client::{HttpSlackClient, SlackApiError},
    modal::{ModalTemplate, TemplateError},
};
use thiserror::Error;
use tracing::info;

use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("modal template is invalid: {0}")]
    Template(#[source] TemplateError),
    #[error("slack client setup failed: {0}")]
    SlackClient(#[source] SlackApiError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let template = ModalTemplate::give_kudos();
    let block_count = template.validate().map_err(BootstrapError::Template)?;
    info!(
        event_name = "system.bootstrap.template_loaded",
        correlation_id = "bootstrap",
        block_count,
        "give-kudos modal template validated"
    );

    let slack = HttpSlackClient::from_config(&config.slack).map_err(BootstrapError::SlackClient)?;
    info!(
        event_name = "system.bootstrap.slack_client_ready",
        correlation_id = "bootstrap",
        api_base_url = %config.slack.api_base_url,
        timeout_secs = config.slack.timeout_secs,
        "slack web api client configured"
    );

    let state = AppState::new(
        Arc::new(slack),
        template,
        config.slack.signing_secret.clone(),
        &config.slack.channel_id,
    );

    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use elogie_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        bootstrap_with_config(AppConfig::load(options)?)
    }

    fn overrides(bot_token: &str, channel_id: &str) -> LoadOptions {
        LoadOptions {
            config_path: Some("does-not-exist.toml".into()),
            overrides: ConfigOverrides {
                slack_bot_token: Some(bot_token.to_string()),
                slack_signing_secret: Some("signing-secret".to_string()),
                slack_channel_id: Some(channel_id.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[test]
    fn bootstrap_fails_fast_without_a_bot_token() {
        let result = bootstrap(overrides("xapp-not-a-bot-token", "C123"));

        let message = result.err().expect("error").to_string();
        assert!(message.contains("slack.bot_token"));
    }

    #[test]
    fn bootstrap_fails_fast_without_a_channel() {
        let result = bootstrap(overrides("xoxb-valid", ""));

        let message = result.err().expect("error").to_string();
        assert!(message.contains("slack.channel_id"));
    }

    #[test]
    fn bootstrap_succeeds_with_complete_slack_settings() {
        let app = bootstrap(overrides("xoxb-valid", "C123")).expect("bootstrap");

        assert_eq!(app.config.slack.channel_id, "C123");
    }
}
