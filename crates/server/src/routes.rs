//! Slash command endpoint.
//!
//! - `POST /`              Slack slash command request URL
//! - `POST /slack/command` same handler under an explicit path
//!
//! Slack expects HTTP 200 with a JSON body for every invocation, so payloads that fail to
//! decode are treated as unauthenticated instead of being rejected.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    routing::post,
    Form, Json, Router,
};
use slackpanel_core::InboundRequest;
use slackpanel_slack::Reply;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::bootstrap::Dispatcher;

#[derive(Clone)]
pub struct CommandState {
    dispatcher: Arc<Dispatcher>,
}

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", post(slash_command))
        .route("/slack/command", post(slash_command))
        .with_state(CommandState { dispatcher })
}

pub async fn slash_command(
    State(state): State<CommandState>,
    payload: Result<Form<InboundRequest>, FormRejection>,
) -> Json<Reply> {
    let correlation_id = Uuid::new_v4();
    let span = info_span!("slash_command", correlation_id = %correlation_id);

    let request = match payload {
        Ok(Form(request)) => request,
        Err(rejection) => {
            warn!(
                parent: &span,
                event_name = "slack.command.undecodable",
                error = %rejection,
                "slash command payload could not be decoded"
            );
            InboundRequest::default()
        }
    };

    let reply = state.dispatcher.dispatch(&request).instrument(span).await;
    Json(reply)
}
