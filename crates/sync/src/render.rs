use std::collections::VecDeque;
use std::fmt::Write as _;

use backscroll_protocol::{ChatMessage, Username};
use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::config::{Clock, DEFAULT_TIME_FORMAT};
use crate::state::Notice;

/// Whether a message was written by the viewing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorStyle {
    Own,
    Other,
}

/// A message prepared for the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Server-provided markup, inserted as-is.
    pub content: String,
    pub author: Username,
    pub style: AuthorStyle,
    pub time_label: String,
    pub created: DateTime<FixedOffset>,
}

impl RenderedMessage {
    /// Author name to display; own messages go unlabeled.
    pub fn author_label(&self) -> Option<&str> {
        match self.style {
            AuthorStyle::Own => None,
            AuthorStyle::Other => Some(self.author.as_str()),
        }
    }
}

/// Turns wire messages into render records for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFormatter {
    viewer: Username,
    time_format: String,
    clock: Clock,
}

impl MessageFormatter {
    pub fn new(viewer: Username, time_format: impl Into<String>, clock: Clock) -> Self {
        Self {
            viewer,
            time_format: time_format.into(),
            clock,
        }
    }

    pub fn format(&self, message: &ChatMessage) -> RenderedMessage {
        let style = if message.username == self.viewer {
            AuthorStyle::Own
        } else {
            AuthorStyle::Other
        };

        RenderedMessage {
            content: message.text.clone(),
            author: message.username.clone(),
            style,
            time_label: self.time_label(message.created),
            created: message.created,
        }
    }

    fn time_label(&self, created: DateTime<FixedOffset>) -> String {
        match self.clock {
            Clock::Local => format_or_default(&created.with_timezone(&Local), &self.time_format),
            Clock::Utc => format_or_default(&created.with_timezone(&Utc), &self.time_format),
        }
    }
}

// chrono reports bad strftime patterns as a fmt error when rendering.
fn format_or_default<Tz>(timestamp: &DateTime<Tz>, pattern: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut label = String::new();
    if write!(label, "{}", timestamp.format(pattern)).is_ok() {
        return label;
    }

    tracing::warn!("invalid time format {:?}, falling back to {:?}", pattern, DEFAULT_TIME_FORMAT);
    timestamp.format(DEFAULT_TIME_FORMAT).to_string()
}

/// Chronologically ordered render records, growable at both ends in O(1).
///
/// Logical order runs oldest to newest. Surfaces that lay messages out newest-first
/// read [`RenderList::iter_physical`] instead.
#[derive(Debug, Clone, Default)]
pub struct RenderList {
    entries: VecDeque<RenderedMessage>,
}

impl RenderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Places a message at the live end, after the current newest one.
    pub fn append(&mut self, record: RenderedMessage) -> &RenderedMessage {
        self.entries.push_back(record);
        &self.entries[self.entries.len() - 1]
    }

    /// Places a message at the historical end, before the current oldest one.
    ///
    /// History pages arrive newest-first, so prepending each message in batch order
    /// leaves the page in chronological order without sorting.
    pub fn prepend(&mut self, record: RenderedMessage) -> &RenderedMessage {
        self.entries.push_front(record);
        &self.entries[0]
    }

    pub fn oldest(&self) -> Option<&RenderedMessage> {
        self.entries.front()
    }

    pub fn newest(&self) -> Option<&RenderedMessage> {
        self.entries.back()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &RenderedMessage> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Newest to oldest.
    pub fn iter_physical(&self) -> impl Iterator<Item = &RenderedMessage> {
        self.entries.iter().rev()
    }
}

/// Narrow interface to whatever draws messages.
pub trait RenderSink {
    /// A record was added at the live end.
    fn insert_newest(&mut self, record: &RenderedMessage);
    /// A record was added at the historical end.
    fn insert_oldest(&mut self, record: &RenderedMessage);
    /// A status line to show at the live end. Not part of the message list.
    fn notice(&mut self, notice: Notice);
}

/// Sink that draws nothing, for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn insert_newest(&mut self, _record: &RenderedMessage) {}

    fn insert_oldest(&mut self, _record: &RenderedMessage) {}

    fn notice(&mut self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str, author: &str, at: &str) -> ChatMessage {
        ChatMessage::new(
            text,
            author,
            DateTime::parse_from_rfc3339(at).expect("timestamp"),
        )
    }

    fn formatter() -> MessageFormatter {
        MessageFormatter::new(Username::new("me"), "%H:%M", Clock::Utc)
    }

    #[test]
    fn own_messages_are_styled_without_author_label() {
        let own = formatter().format(&message("hi", "me", "2024-02-03T09:05:00Z"));
        let other = formatter().format(&message("yo", "zed", "2024-02-03T09:06:00Z"));

        assert_eq!(own.style, AuthorStyle::Own);
        assert_eq!(own.author_label(), None);
        assert_eq!(other.style, AuthorStyle::Other);
        assert_eq!(other.author_label(), Some("zed"));
    }

    #[test]
    fn time_label_uses_configured_clock() {
        let record = formatter().format(&message("hi", "me", "2024-02-03T23:45:10+02:00"));
        assert_eq!(record.time_label, "21:45");
    }

    #[test]
    fn markup_is_passed_through_untouched() {
        let record =
            formatter().format(&message("<b>bold</b> &amp;", "zed", "2024-02-03T09:05:00Z"));
        assert_eq!(record.content, "<b>bold</b> &amp;");
    }

    #[test]
    fn append_and_prepend_keep_chronological_order() {
        let formatter = formatter();
        let mut list = RenderList::new();
        list.append(formatter.format(&message("10", "a", "2024-01-01T10:00:00Z")));
        list.append(formatter.format(&message("11", "a", "2024-01-01T11:00:00Z")));
        // history page, newest first
        for text in ["09", "08"] {
            let at = format!("2024-01-01T{text}:00:00Z");
            list.prepend(formatter.format(&message(text, "a", &at)));
        }

        let logical: Vec<_> = list.iter().map(|record| record.content.as_str()).collect();
        assert_eq!(logical, ["08", "09", "10", "11"]);
        let physical: Vec<_> = list.iter_physical().map(|record| record.content.as_str()).collect();
        assert_eq!(physical, ["11", "10", "09", "08"]);
        assert_eq!(list.oldest().map(|record| record.content.as_str()), Some("08"));
        assert_eq!(list.newest().map(|record| record.content.as_str()), Some("11"));
    }
}
