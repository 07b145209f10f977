use serde::{Serialize, Serializer};

pub const AUTH_DENIED: &str = "not authenticated.";
pub const COUNTRY_NOT_SELECTED: &str = "please select a country (example: country AT)";
pub const ANALYTICS_UNAVAILABLE: &str = "mixpanel could not be reached, please try again later.";

pub const HELP_TEXT: &str = concat!(
    "\n",
    "*/mixpanel current*                     _gets the current amount of users_\n",
    "*/mixpanel lastseen*                   _gets the amount of users in the last week_\n",
    "*/mixpanel lastseen XXX*        _gets the amount of users in the last period (example: lastseen 1 week, lastseen 15 minutes)_\n",
    "*/mixpanel country XXX*         _gets the amount of users in the country (example: country US, country AT)_\n",
    "*/mixpanel help*                             _returns helpful information on how to use this command_\n",
);

pub fn current_users_message(count: u64) -> String {
    format!("Currently there are *{count}* users.")
}

pub fn last_seen_users_message(count: u64, period: &str) -> String {
    format!("*{count}* users where using the app in the last {period}.")
}

pub fn country_users_message(count: u64, code: &str) -> String {
    format!("*{count}* users are from {code}.")
}

pub fn invalid_command_message(text: &str) -> String {
    format!("'{text}' is not valid command. see */mixpanel* help for more information.")
}

pub fn invalid_period_message(period: &str) -> String {
    format!(
        "'{period}' is not a valid time period (example: lastseen 1 week, lastseen 15 minutes)"
    )
}

/// Slack shows an empty `response_type` only to the invoking user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseType {
    InChannel,
    Ephemeral,
}

impl ResponseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InChannel => "in_channel",
            Self::Ephemeral => "",
        }
    }
}

impl Serialize for ResponseType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub response_type: ResponseType,
    pub text: String,
}

impl Reply {
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::InChannel, text: text.into() }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { response_type: ResponseType::Ephemeral, text: text.into() }
    }
}

pub fn format_reply(text: impl Into<String>, post_to_channel: bool) -> Reply {
    if post_to_channel {
        Reply::in_channel(text)
    } else {
        Reply::ephemeral(text)
    }
}
