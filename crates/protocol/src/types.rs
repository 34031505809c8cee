use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use super::error::{EncodeRequestSnafu, ProtocolResult};

/// Action tag the server echoes back on history responses.
pub const LOAD_MORE_ACTION: &str = "loadMore";
/// Action tag for messages the client wants fanned out to everyone.
pub const BROADCAST_ACTION: &str = "broadcast";

/// Display name of a chat participant, as assigned by the server session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl Username {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for Username {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Username {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One chat message as delivered by the server.
///
/// `text` is pre-rendered by the server and treated as opaque markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub username: Username,
    pub created: DateTime<FixedOffset>,
}

impl ChatMessage {
    pub fn new(
        text: impl Into<String>,
        username: impl Into<Username>,
        created: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            text: text.into(),
            username: username.into(),
            created,
        }
    }
}

/// Ordered messages carried by one inbound event.
pub type Batch = Vec<ChatMessage>;

/// Outbound requests understood by the chat server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    LoadMore { offset: u64 },
    Broadcast { message: String },
}

impl Request {
    pub fn load_more(offset: usize) -> Self {
        Self::LoadMore {
            offset: offset as u64,
        }
    }

    pub fn broadcast(message: impl Into<String>) -> Self {
        Self::Broadcast {
            message: message.into(),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Self::LoadMore { .. } => LOAD_MORE_ACTION,
            Self::Broadcast { .. } => BROADCAST_ACTION,
        }
    }
}

/// Serializes a request into the text frame sent over the channel.
pub fn encode_request(request: &Request) -> ProtocolResult<String> {
    serde_json::to_string(request).context(EncodeRequestSnafu {
        stage: "encode-request",
    })
}
