//! Slack Integration - `/mixpanel` slash command
//!
//! This crate turns a Slack slash-command invocation into a Mixpanel query and a reply:
//! - **Commands** (`commands`) - authentication, keyword routing, command handlers
//! - **Replies** (`replies`) - message catalogue and the JSON reply envelope
//!
//! # Flow
//!
//! ```text
//! Slash command → authenticate → route → AnalyticsBackend → format_reply
//! ```
//!
//! # Key Types
//!
//! - `CommandDispatcher` - owns the Slack settings and the analytics backend
//! - `SlackCommand` - the parsed command
//! - `Reply` - the `{"response_type", "text"}` envelope Slack expects

pub mod commands;
pub mod replies;

pub use commands::{authenticate, route, CommandDispatcher, CommandError, SlackCommand};
pub use replies::{format_reply, Reply, ResponseType};
