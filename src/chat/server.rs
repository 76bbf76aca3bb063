//! Inbound Slack Events API endpoint
//!
//! Slack expects an answer within three seconds, so command work runs on a
//! spawned task and the request is acknowledged immediately.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::command::{Command, CommandMatcher, Inbound};
use super::message::Destination;
use super::sender::Sender;
use crate::announcer::{Announcer, ListingOutcome};

type HmacSha256 = Hmac<Sha256>;

/// Requests whose timestamp is further than this from now are rejected
const MAX_REQUEST_AGE_SECS: i64 = 300;

/// Shared state for the HTTP handlers
pub struct ServerState {
    /// Announcer used for on-demand listings
    pub announcer: Arc<Announcer>,
    /// Where replies are sent
    pub sender: Arc<dyn Sender>,
    /// Command recognizer
    pub matcher: CommandMatcher,
    /// Slack signing secret; verification is skipped when unset
    pub signing_secret: Option<String>,
    /// Whether scheduled announcements are running, reported by /health
    pub scheduler_enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    UrlVerification { challenge: String },
    EventCallback { event: SlackEvent },
    #[serde(other)]
    Other,
}

/// The subset of a Slack message event the bot looks at
#[derive(Debug, Clone, Deserialize)]
pub struct SlackEvent {
    /// `app_mention` or `message`
    #[serde(rename = "type")]
    pub kind: String,
    /// Message text
    #[serde(default)]
    pub text: Option<String>,
    /// Conversation id
    #[serde(default)]
    pub channel: Option<String>,
    /// `im` for direct messages
    #[serde(default)]
    pub channel_type: Option<String>,
    /// Present when a bot authored the message
    #[serde(default)]
    pub bot_id: Option<String>,
    /// Message subtype, e.g. `bot_message`, `message_changed`
    #[serde(default)]
    pub subtype: Option<String>,
}

impl SlackEvent {
    fn inbound(&self) -> Inbound<'_> {
        let addressed_to_bot = match self.kind.as_str() {
            "app_mention" => true,
            "message" => self.channel_type.as_deref() == Some("im"),
            _ => false,
        };
        Inbound {
            text: self.text.as_deref().unwrap_or_default(),
            addressed_to_bot,
            from_bot: self.bot_id.is_some() || self.subtype.as_deref() == Some("bot_message"),
        }
    }

    /// Edits and deletions of earlier messages, never treated as commands
    fn is_edit(&self) -> bool {
        matches!(
            self.subtype.as_deref(),
            Some("message_changed" | "message_deleted")
        )
    }
}

impl ServerState {
    /// Run the command carried by `event`, if any, on a background task.
    pub fn dispatch(&self, event: &SlackEvent) -> Option<JoinHandle<ListingOutcome>> {
        if event.is_edit() {
            return None;
        }
        let command = self.matcher.parse(&event.inbound())?;
        let channel = event.channel.clone()?;

        match command {
            Command::ShowUpcomingEvents => {
                info!(channel = %channel, "Received show upcoming events command");
                let announcer = self.announcer.clone();
                let sender = self.sender.clone();
                Some(tokio::spawn(async move {
                    let destination = Destination::Reply { channel };
                    announcer.show_upcoming(sender.as_ref(), &destination).await
                }))
            }
        }
    }
}

/// Check a Slack request signature.
///
/// `signature` is the `X-Slack-Signature` header (`v0=<hex>`), `timestamp`
/// the `X-Slack-Request-Timestamp` header, `now` the current unix time.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> bool {
    let Ok(ts) = timestamp.parse::<i64>() else {
        return false;
    };
    if (now - ts).abs() > MAX_REQUEST_AGE_SECS {
        return false;
    }

    let Some(expected) = signature
        .strip_prefix("v0=")
        .and_then(|h| hex::decode(h).ok())
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn slack_events(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(secret) = &state.signing_secret {
        let now = chrono::Utc::now().timestamp();
        let valid = verify_signature(
            secret,
            header(&headers, "x-slack-request-timestamp"),
            &body,
            header(&headers, "x-slack-signature"),
            now,
        );
        if !valid {
            warn!("Rejected Slack request with invalid signature");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let envelope: Envelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Malformed Slack event payload");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        Envelope::UrlVerification { challenge } => {
            info!("Answering Slack URL verification");
            Json(serde_json::json!({ "challenge": challenge })).into_response()
        }
        Envelope::EventCallback { event } => {
            // Slack redelivers when it thinks we were slow; the original
            // delivery already triggered the reply.
            if headers.contains_key("x-slack-retry-num") {
                debug!("Ignoring Slack retry");
                return StatusCode::OK.into_response();
            }
            state.dispatch(&event);
            StatusCode::OK.into_response()
        }
        Envelope::Other => StatusCode::OK.into_response(),
    }
}

async fn health(State(state): State<Arc<ServerState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "scheduler": state.scheduler_enabled,
    }))
}

/// HTTP routes for the bot
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events))
        .route("/health", get(health))
        .with_state(state)
}
