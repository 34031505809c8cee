use std::io::{self, Write};

use backscroll_sync::{Notice, RenderSink, RenderedMessage};

/// Line-oriented render surface.
///
/// A terminal can only grow downward, so history inserted at the top of the
/// conversation is printed with a `^` marker instead.
pub struct TerminalSurface<W> {
    writer: W,
}

impl TerminalSurface<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, marker: &str, record: &RenderedMessage) {
        let line = match record.author_label() {
            Some(author) => format!("{marker}[{}] {author}: {}", record.time_label, record.content),
            None => format!("{marker}[{}] > {}", record.time_label, record.content),
        };
        self.write_line(&line);
    }

    fn write_line(&mut self, line: &str) {
        if let Err(error) = writeln!(self.writer, "{line}").and_then(|_| self.writer.flush()) {
            tracing::warn!("failed to write to terminal: {}", error);
        }
    }
}

impl<W: Write> RenderSink for TerminalSurface<W> {
    fn insert_newest(&mut self, record: &RenderedMessage) {
        self.write_record("", record);
    }

    fn insert_oldest(&mut self, record: &RenderedMessage) {
        self.write_record("^ ", record);
    }

    fn notice(&mut self, notice: Notice) {
        self.write_line(&format!("-- {} --", notice.text()));
    }
}
