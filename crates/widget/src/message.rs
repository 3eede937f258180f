use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Stable identifier for one message within a widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl MessageId {
    /// Creates a typed message identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

/// Message payload: free text or a single emoji sticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "snake_case")]
pub enum MessageContent {
    Text(String),
    Sticker(String),
}

impl MessageContent {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Sticker(_) => None,
        }
    }

    pub fn sticker(&self) -> Option<&str> {
        match self {
            Self::Sticker(glyph) => Some(glyph),
            Self::Text(_) => None,
        }
    }
}

/// One entry of the append-only message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub content: MessageContent,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(id: MessageId, sender: Sender, content: MessageContent) -> Self {
        Self {
            id,
            content,
            sender,
            timestamp: Local::now(),
        }
    }

    pub fn user_text(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, Sender::User, MessageContent::Text(text.into()))
    }

    pub fn user_sticker(id: MessageId, glyph: impl Into<String>) -> Self {
        Self::new(id, Sender::User, MessageContent::Sticker(glyph.into()))
    }

    pub fn bot_text(id: MessageId, text: impl Into<String>) -> Self {
        Self::new(id, Sender::Bot, MessageContent::Text(text.into()))
    }

    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// Creation time rendered as a clock label, e.g. `3:04:05 PM`.
    pub fn clock_label(&self) -> String {
        self.timestamp.format("%-I:%M:%S %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn sticker_content_serializes_as_tagged_union() {
        let content = MessageContent::Sticker("🚀".to_string());
        let json = serde_json::to_value(&content).expect("serialize sticker");

        assert_eq!(json, serde_json::json!({ "type": "sticker", "body": "🚀" }));
        assert_eq!(content.sticker(), Some("🚀"));
        assert_eq!(content.text(), None);
    }

    #[test]
    fn clock_label_uses_twelve_hour_time() {
        let mut message = Message::user_text(MessageId::new(1), "hi");
        message.timestamp = Local
            .with_ymd_and_hms(2024, 5, 17, 15, 4, 5)
            .single()
            .expect("unambiguous local time");

        assert_eq!(message.clock_label(), "3:04:05 PM");
    }
}
