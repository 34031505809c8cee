use snafu::{Snafu, ensure};

/// Lifecycle and data events coming off the chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(String),
    Closed,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransportError {
    #[snafu(display("transport is not connected on `{stage}`"))]
    Disconnected { stage: &'static str },
    #[snafu(display("transport channel closed on `{stage}`"))]
    ChannelClosed { stage: &'static str },
}

pub type TransportResult<T> = Result<T, TransportError>;

/// One bidirectional text channel. Owns no chat semantics.
pub trait Transport {
    fn is_connected(&self) -> bool;
    fn send(&mut self, frame: String) -> TransportResult<()>;
    fn close(&mut self);
}

/// In-process transport that records outbound frames.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    connected: bool,
    sent: Vec<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        Self {
            connected: true,
            sent: Vec::new(),
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sent)
    }
}

impl Transport for MemoryTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send(&mut self, frame: String) -> TransportResult<()> {
        ensure!(
            self.connected,
            DisconnectedSnafu {
                stage: "memory-transport-send",
            }
        );
        self.sent.push(frame);
        Ok(())
    }

    fn close(&mut self) {
        self.connected = false;
    }
}
