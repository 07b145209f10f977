use std::fmt;

use serde::{Deserialize, Serialize};

/// One slash-command invocation as posted by Slack.
///
/// Only the fields the bridge acts on are kept; everything else in the form body
/// (`channel_id`, `response_url`, ...) is ignored during deserialization.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InboundRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default, rename = "token")]
    pub auth_token: String,
    #[serde(default, rename = "text")]
    pub command_text: String,
}

impl InboundRequest {
    pub fn new(
        user_id: impl Into<String>,
        auth_token: impl Into<String>,
        command_text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            auth_token: auth_token.into(),
            command_text: command_text.into(),
        }
    }
}

impl fmt::Debug for InboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundRequest")
            .field("user_id", &self.user_id)
            .field("auth_token", &"[REDACTED]")
            .field("command_text", &self.command_text)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::InboundRequest;

    #[test]
    fn debug_output_redacts_token() {
        let request = InboundRequest::new("U1", "very-secret", "current");
        let debug = format!("{request:?}");

        assert!(debug.contains("U1"));
        assert!(debug.contains("current"));
        assert!(!debug.contains("very-secret"));
    }
}
