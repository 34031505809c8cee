use serde::Deserialize;
use snafu::ResultExt;

use super::error::{DecodeInboundSnafu, ProtocolResult};
use super::types::{Batch, ChatMessage, LOAD_MORE_ACTION};

/// Classified inbound event.
///
/// Produced only by [`parse_inbound`]; handlers never look at raw payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Messages pushed at the live end, including echoes of our own broadcasts.
    Live(Batch),
    /// A non-empty page of older messages answering a `loadMore` request.
    History(Batch),
    /// A `loadMore` answer with no messages left.
    HistoryExhausted,
}

impl Inbound {
    pub fn kind(&self) -> BatchKind {
        match self {
            Self::Live(_) => BatchKind::Live,
            Self::History(_) | Self::HistoryExhausted => BatchKind::History,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Live(batch) | Self::History(batch) => batch.len(),
            Self::HistoryExhausted => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which end of the list a batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    Live,
    History,
}

#[derive(Debug, Deserialize)]
struct WireUpdate {
    #[serde(default)]
    request: Option<WireRequestEcho>,
    messages: Vec<ChatMessage>,
}

// The server echoes its whole request object; only the action matters here.
#[derive(Debug, Deserialize)]
struct WireRequestEcho {
    action: String,
}

/// Validates and classifies one inbound text frame.
pub fn parse_inbound(frame: &str) -> ProtocolResult<Inbound> {
    let update: WireUpdate = serde_json::from_str(frame).context(DecodeInboundSnafu {
        stage: "parse-inbound-update",
    })?;

    let is_history = update
        .request
        .as_ref()
        .is_some_and(|echo| echo.action == LOAD_MORE_ACTION);

    Ok(match (is_history, update.messages.is_empty()) {
        (true, true) => Inbound::HistoryExhausted,
        (true, false) => Inbound::History(update.messages),
        (false, _) => Inbound::Live(update.messages),
    })
}
