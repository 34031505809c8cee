use serde::{Deserialize, Serialize};

/// Exact-boundary policy: only fire when the surface touches the oldest message.
pub const DEFAULT_SCROLL_THRESHOLD: f32 = 0.0;
/// Largest frame the server reads before dropping the connection.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 2048;
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// Which clock message timestamps are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clock {
    #[default]
    Local,
    Utc,
}

/// Tunables for one chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Distance from the history edge at or below which older messages are requested.
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f32,
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// `chrono` strftime pattern for the per-message time label.
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub clock: Clock,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            time_format: default_time_format(),
            clock: Clock::default(),
        }
    }
}

impl SyncConfig {
    pub fn normalized(mut self) -> Self {
        if !self.scroll_threshold.is_finite() || self.scroll_threshold < 0.0 {
            self.scroll_threshold = DEFAULT_SCROLL_THRESHOLD;
        }
        if self.max_message_bytes == 0 {
            self.max_message_bytes = DEFAULT_MAX_MESSAGE_BYTES;
        }
        self.time_format = self.time_format.trim().to_string();
        if self.time_format.is_empty() {
            self.time_format = default_time_format();
        }
        self
    }

    pub fn with_scroll_threshold(mut self, threshold: f32) -> Self {
        self.scroll_threshold = threshold;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

fn default_scroll_threshold() -> f32 {
    DEFAULT_SCROLL_THRESHOLD
}

fn default_max_message_bytes() -> usize {
    DEFAULT_MAX_MESSAGE_BYTES
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}
