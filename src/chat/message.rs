//! Outbound chat message structure
//!
//! Mirrors the Slack "secondary attachment" layout: optional plain text
//! plus attachments carrying a title, short fields, a thumbnail and a
//! footer.

use serde::{Deserialize, Serialize};

/// Where a message goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Back into the conversation a command came from
    Reply {
        /// Conversation id of the originating message
        channel: String,
    },
    /// A configured, named channel
    Channel(String),
}

impl Destination {
    /// Channel identifier or name as the chat API expects it
    pub fn target(&self) -> &str {
        match self {
            Destination::Reply { channel } => channel,
            Destination::Channel(name) => name,
        }
    }
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Plain text body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Rich attachments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Text-only message
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            attachments: Vec::new(),
        }
    }

    /// Look up a field value by title across all attachments
    pub fn field(&self, title: &str) -> Option<&str> {
        self.attachments
            .iter()
            .flat_map(|a| a.fields.iter())
            .find(|f| f.title == title)
            .map(|f| f.value.as_str())
    }
}

/// Rich attachment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attachment {
    /// Plain-text summary for clients that cannot render attachments
    pub fallback: String,
    /// Bold title line
    pub title: String,
    /// Link behind the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    /// Key/value fields
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Small image shown to the right
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    /// Footer line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// Attachment field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field label
    pub title: String,
    /// Field content
    pub value: String,
    /// Render side by side with neighbouring short fields
    #[serde(default)]
    pub short: bool,
}
