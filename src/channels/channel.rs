//! Channel trait and message types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

/// A message arriving from a chat transport.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Which channel produced this message.
    pub channel: String,
    /// The platform's numeric user identifier.
    pub user_id: i64,
    /// Message text.
    pub content: String,
    /// Display name, when the transport provides one.
    pub user_name: Option<String>,
    /// Channel-specific extras (e.g. the Telegram chat id for replies).
    pub metadata: serde_json::Value,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: i64, content: &str) -> Self {
        Self {
            channel: channel.to_string(),
            user_id,
            content: content.to_string(),
            user_name: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = Some(name.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A reply heading back out over a channel.
#[derive(Debug, Clone)]
pub struct OutgoingResponse {
    pub content: String,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Stream of incoming messages produced by a started channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A chat transport: produces incoming messages, delivers replies.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start listening; returns the stream of incoming messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a reply to the conversation `msg` came from.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incoming_message_builders() {
        let msg = IncomingMessage::new("telegram", 42, "/register")
            .with_user_name("Jane")
            .with_metadata(serde_json::json!({"chat_id": "42"}));

        assert_eq!(msg.channel, "telegram");
        assert_eq!(msg.user_id, 42);
        assert_eq!(msg.user_name.as_deref(), Some("Jane"));
        assert_eq!(
            msg.metadata.get("chat_id").and_then(|v| v.as_str()),
            Some("42")
        );
    }
}
