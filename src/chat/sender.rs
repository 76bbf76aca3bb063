//! Message delivery
//!
//! [`Sender`] is the seam between formatting and the chat platform. The
//! scheduled path and the command path both publish through it, only the
//! [`Destination`] differs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::message::{Attachment, Destination, Message};
use crate::config::Config;
use crate::error::PublishError;

/// Delivers messages to a destination
#[async_trait]
pub trait Sender: Send + Sync {
    /// Send one message
    async fn send(&self, destination: &Destination, message: &Message)
        -> Result<(), PublishError>;
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "no_attachments")]
    attachments: &'a [Attachment],
}

fn no_attachments(attachments: &&[Attachment]) -> bool {
    attachments.is_empty()
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API sender using `chat.postMessage`
pub struct SlackSender {
    client: Client,
    api_base: String,
    token: String,
}

impl SlackSender {
    /// Create a sender for the given API base and bot token
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Http` if the HTTP client cannot be created.
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self, PublishError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_base: api_base.into(),
            token: token.into(),
        })
    }

    /// Create a sender from configuration; `None` when no bot token is set
    ///
    /// # Errors
    ///
    /// Returns `PublishError::Http` if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Option<Self>, PublishError> {
        match &config.slack.bot_token {
            Some(token) if !token.trim().is_empty() => {
                Ok(Some(Self::new(config.slack.api_base.clone(), token.clone())?))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl Sender for SlackSender {
    async fn send(
        &self,
        destination: &Destination,
        message: &Message,
    ) -> Result<(), PublishError> {
        let url = format!("{}/chat.postMessage", self.api_base.trim_end_matches('/'));
        let request = PostMessageRequest {
            channel: destination.target(),
            text: message.text.as_deref(),
            attachments: &message.attachments,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            let error = body.error.unwrap_or_else(|| "unknown_error".to_string());
            warn!(channel = %destination.target(), error = %error, "Slack rejected message");
            return Err(PublishError::Api { error });
        }

        debug!(channel = %destination.target(), "Message posted");
        Ok(())
    }
}

/// Sender that only logs what it would have posted
#[derive(Debug, Default, Clone)]
pub struct LogSender;

#[async_trait]
impl Sender for LogSender {
    async fn send(
        &self,
        destination: &Destination,
        message: &Message,
    ) -> Result<(), PublishError> {
        let rendered = serde_json::to_string(message).unwrap_or_default();
        info!(
            channel = %destination.target(),
            message = %rendered,
            "Dry run: message not posted"
        );
        Ok(())
    }
}
