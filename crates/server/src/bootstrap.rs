use std::sync::Arc;

use slackpanel_analytics::{AnalyticsClient, AnalyticsError};
use slackpanel_core::config::{AppConfig, ConfigError};
use slackpanel_slack::CommandDispatcher;
use thiserror::Error;
use tracing::info;

pub type Dispatcher = CommandDispatcher<AnalyticsClient>;

pub struct Application {
    pub config: AppConfig,
    pub dispatcher: Arc<Dispatcher>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("analytics client setup failed: {0}")]
    Analytics(#[source] AnalyticsError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let client = AnalyticsClient::new(&config.mixpanel).map_err(BootstrapError::Analytics)?;
    let dispatcher =
        Arc::new(CommandDispatcher::new(config.slack.clone(), config.timezone, client));

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        authorized_users = config.slack.auth_users.len(),
        post_to_channel = config.slack.post_to_channel,
        timezone = %config.timezone,
        analytics_base_url = %config.mixpanel.base_url,
        "command dispatcher ready"
    );

    Ok(Application { config, dispatcher })
}

#[cfg(test)]
mod tests {
    use slackpanel_core::config::{AppConfig, ConfigOverrides, LoadOptions};

    use crate::bootstrap::{bootstrap_with_config, BootstrapError};

    #[test]
    fn config_validation_fails_fast_without_slack_token() {
        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                slack_auth_users: Some(vec!["U1".to_string()]),
                mixpanel_key: Some("key".to_string()),
                mixpanel_secret: Some("secret".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = BootstrapError::from(result.err().expect("error")).to_string();
        assert!(message.contains("slack.token"));
    }

    #[test]
    fn bootstrap_builds_dispatcher_from_valid_overrides() {
        let config = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                slack_token: Some("T".to_string()),
                slack_auth_users: Some(vec!["U1".to_string()]),
                post_to_channel: Some(true),
                mixpanel_key: Some("key".to_string()),
                mixpanel_secret: Some("secret".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("config should load with valid overrides");

        let app = bootstrap_with_config(config).expect("bootstrap should succeed");

        assert!(app.config.slack.post_to_channel);
        assert!(app.config.slack.auth_users.contains("U1"));
    }
}
