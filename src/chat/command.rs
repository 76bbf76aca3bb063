//! Inbound command recognition
//!
//! A command is only considered when the message is directed at the bot:
//! an explicit mention, or any message in a direct conversation.

use anyhow::Result;
use regex::Regex;

/// Phrase that triggers the upcoming-events listing. Leading bot mentions
/// (`<@U123>`, optionally followed by `:` or `,`) are allowed.
const SHOW_UPCOMING_PATTERN: &str = r"(?i)^\s*(?:<@[A-Z0-9]+>[\s:,]*)*show upcoming events\b";

/// Commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// List every upcoming event, ignoring the watermark
    ShowUpcomingEvents,
}

/// An inbound chat message, reduced to what command matching needs
#[derive(Debug, Clone, Default)]
pub struct Inbound<'a> {
    /// Message text
    pub text: &'a str,
    /// True for mentions of the bot and for direct messages
    pub addressed_to_bot: bool,
    /// True when the author is a bot (including ourselves)
    pub from_bot: bool,
}

/// Matches inbound messages against known commands
#[derive(Debug, Clone)]
pub struct CommandMatcher {
    show_upcoming: Regex,
}

impl CommandMatcher {
    /// Compile the command patterns
    ///
    /// # Errors
    ///
    /// Returns error if a pattern fails to compile
    pub fn new() -> Result<Self> {
        Ok(Self {
            show_upcoming: Regex::new(SHOW_UPCOMING_PATTERN)?,
        })
    }

    /// Recognize a command in `message`, if any
    pub fn parse(&self, message: &Inbound<'_>) -> Option<Command> {
        if message.from_bot || !message.addressed_to_bot {
            return None;
        }

        if self.show_upcoming.is_match(message.text) {
            Some(Command::ShowUpcomingEvents)
        } else {
            None
        }
    }
}
