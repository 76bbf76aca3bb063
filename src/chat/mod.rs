//! Chat platform integration
//!
//! Outbound messages go through a [`Sender`]; inbound Slack events arrive
//! on the HTTP endpoint in [`server`] and are matched by [`CommandMatcher`].

pub mod command;
pub mod message;
pub mod sender;
pub mod server;

pub use command::{Command, CommandMatcher, Inbound};
pub use message::{Attachment, Destination, Field, Message};
pub use sender::{LogSender, Sender, SlackSender};
pub use server::{router, verify_signature, ServerState};
