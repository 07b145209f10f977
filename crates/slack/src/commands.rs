use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use secrecy::ExposeSecret;
use slackpanel_analytics::{selector, AnalyticsBackend, AnalyticsError, AnalyticsQuery};
use slackpanel_core::domain::period::format_local_timestamp;
use slackpanel_core::{InboundRequest, PeriodError, RelativePeriod, SlackConfig};
use thiserror::Error;
use tracing::{info, warn};

use crate::replies::{self, format_reply, Reply};

pub const DEFAULT_LAST_SEEN_PERIOD: &str = "1 week";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlackCommand {
    Help,
    Current,
    LastSeen { period: String },
    Country { code: String },
    Invalid { text: String },
}

impl SlackCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Current => "current",
            Self::LastSeen { .. } => "lastseen",
            Self::Country { .. } => "country",
            Self::Invalid { .. } => "invalid",
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("lastseen period `{period}` could not be parsed: {source}")]
    InvalidPeriod {
        period: String,
        #[source]
        source: PeriodError,
    },
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl CommandError {
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidPeriod { period, .. } => replies::invalid_period_message(period),
            Self::Analytics(_) => replies::ANALYTICS_UNAVAILABLE.to_owned(),
        }
    }
}

/// Loose keyword routing: a keyword anywhere in the text selects its command, so
/// `uncountry` routes to `Country`. Help wins over everything, `current` must match exactly.
pub fn route(text: &str) -> SlackCommand {
    if text.is_empty() || text.contains("help") {
        return SlackCommand::Help;
    }

    if text == "current" {
        return SlackCommand::Current;
    }

    if let Some(argument) = argument_after(text, "lastseen") {
        let period = if argument.is_empty() { DEFAULT_LAST_SEEN_PERIOD } else { argument };
        return SlackCommand::LastSeen { period: period.to_owned() };
    }

    if let Some(argument) = argument_after(text, "country") {
        return SlackCommand::Country { code: argument.to_owned() };
    }

    SlackCommand::Invalid { text: text.to_owned() }
}

fn argument_after<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    text.find(keyword).map(|index| text[index + keyword.len()..].trim())
}

pub fn authenticate(request: &InboundRequest, slack: &SlackConfig) -> bool {
    slack.auth_users.contains(&request.user_id)
        && request.auth_token == slack.token.expose_secret()
}

pub struct CommandDispatcher<B> {
    slack: SlackConfig,
    timezone: Tz,
    backend: B,
}

impl<B> CommandDispatcher<B>
where
    B: AnalyticsBackend,
{
    pub fn new(slack: SlackConfig, timezone: Tz, backend: B) -> Self {
        Self { slack, timezone, backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Always yields exactly one reply; failures become reply text.
    pub async fn dispatch(&self, request: &InboundRequest) -> Reply {
        self.dispatch_at(request, Utc::now()).await
    }

    pub async fn dispatch_at(&self, request: &InboundRequest, now: DateTime<Utc>) -> Reply {
        if !authenticate(request, &self.slack) {
            warn!(
                event_name = "slack.command.denied",
                user_id = %request.user_id,
                "slash command rejected: unknown user or token mismatch"
            );
            return Reply::ephemeral(replies::AUTH_DENIED);
        }

        let command = route(&request.command_text);
        let kind = command.kind();
        info!(
            event_name = "slack.command.routed",
            user_id = %request.user_id,
            command = kind,
            "slash command routed"
        );

        match self.handle_at(command, now).await {
            Ok(text) => format_reply(text, self.slack.post_to_channel),
            Err(error) => {
                warn!(
                    event_name = "slack.command.failed",
                    command = kind,
                    error = %error,
                    "slash command could not be completed"
                );
                Reply::ephemeral(error.user_message())
            }
        }
    }

    pub async fn handle(&self, command: SlackCommand) -> Result<String, CommandError> {
        self.handle_at(command, Utc::now()).await
    }

    pub async fn handle_at(
        &self,
        command: SlackCommand,
        now: DateTime<Utc>,
    ) -> Result<String, CommandError> {
        match command {
            SlackCommand::Help => Ok(replies::HELP_TEXT.to_owned()),
            SlackCommand::Current => {
                let count = self.backend.count(&AnalyticsQuery::engage_stats()).await?;
                Ok(replies::current_users_message(count))
            }
            SlackCommand::LastSeen { period } => {
                let cutoff = period
                    .parse::<RelativePeriod>()
                    .and_then(|parsed| parsed.cutoff_before(&now.with_timezone(&self.timezone)))
                    .map_err(|source| CommandError::InvalidPeriod { period: period.clone(), source })?;
                let query = AnalyticsQuery::engage_stats()
                    .selector(selector::last_seen_since(&format_local_timestamp(&cutoff)));
                let count = self.backend.count(&query).await?;
                Ok(replies::last_seen_users_message(count, &period))
            }
            SlackCommand::Country { code } => {
                if code.is_empty() {
                    return Ok(replies::COUNTRY_NOT_SELECTED.to_owned());
                }
                let query =
                    AnalyticsQuery::engage_stats().selector(selector::country_code_is(&code));
                let count = self.backend.count(&query).await?;
                Ok(replies::country_users_message(count, &code))
            }
            SlackCommand::Invalid { text } => Ok(replies::invalid_command_message(&text)),
        }
    }
}
