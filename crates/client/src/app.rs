use backscroll_protocol::Username;
use backscroll_sync::{
    ChatSession, Compose, Notice, RenderSink, ScrollTrigger, Transport, TransportEvent,
};
use snafu::ResultExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::{ClientResult, ReadInputSnafu};
use crate::settings::ClientSettings;
use crate::terminal::TerminalSurface;
use crate::websocket;

/// One line typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Behave as if the view was scrolled to the oldest message.
    LoadMore,
    Quit,
    Say(String),
}

impl InputCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/more" => Self::LoadMore,
            "/quit" => Self::Quit,
            _ => Self::Say(line.to_string()),
        }
    }
}

/// Connects and runs the chat view until the connection ends.
pub async fn run(settings: &ClientSettings) -> ClientResult<()> {
    let connection = match websocket::connect(&settings.server_url).await {
        Ok(connection) => connection,
        Err(error) => {
            TerminalSurface::stdout().notice(Notice::ConnectFailed);
            return Err(error);
        }
    };

    let session = ChatSession::new(
        connection.transport,
        Username::new(settings.username.clone()),
        settings.sync.clone(),
    )
    .with_sink(TerminalSurface::stdout());

    let mut view = ChatView::new(session);
    let mut events = connection.events;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                let closed = matches!(event, Some(TransportEvent::Closed) | None);
                view.session.handle(event.unwrap_or(TransportEvent::Closed));
                if closed {
                    break;
                }
            }
            line = lines.next_line(), if input_open => {
                match line.context(ReadInputSnafu { stage: "read-stdin-line" })? {
                    Some(line) => view.handle_input(InputCommand::parse(&line)),
                    None => {
                        input_open = false;
                        view.handle_input(InputCommand::Quit);
                    }
                }
            }
        }
    }

    if let Err(error) = connection.pump.await {
        tracing::warn!("websocket pump ended abnormally: {}", error);
    }
    Ok(())
}

/// Session plus the user-facing controls that drive it.
pub struct ChatView<T> {
    pub session: ChatSession<T>,
    pub compose: Compose,
    pub trigger: ScrollTrigger,
}

impl<T: Transport> ChatView<T> {
    pub fn new(session: ChatSession<T>) -> Self {
        let trigger = ScrollTrigger::new(session.config().scroll_threshold);
        Self {
            session,
            compose: Compose::new(),
            trigger,
        }
    }

    pub fn handle_input(&mut self, command: InputCommand) {
        match command {
            InputCommand::LoadMore => {
                if !self.trigger.on_proximity(0.0, &mut self.session) {
                    tracing::debug!(state = ?self.session.state(), "history request suppressed");
                }
            }
            InputCommand::Quit => self.session.transport_mut().close(),
            InputCommand::Say(text) => {
                self.compose.set_input(text);
                if !self.compose.submit(&mut self.session) {
                    tracing::debug!("message not sent");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use backscroll_sync::{MemoryTransport, SyncConfig};

    use super::*;

    fn view() -> ChatView<MemoryTransport> {
        let session = ChatSession::new(
            MemoryTransport::connected(),
            Username::new("me"),
            SyncConfig::default(),
        );
        ChatView::new(session)
    }

    #[test]
    fn commands_are_recognized_after_trimming() {
        assert_eq!(InputCommand::parse(" /more "), InputCommand::LoadMore);
        assert_eq!(InputCommand::parse("/quit"), InputCommand::Quit);
        assert_eq!(InputCommand::parse("/moreover"), InputCommand::Say("/moreover".to_string()));
    }

    #[test]
    fn load_more_goes_through_the_scroll_guard() {
        let mut view = view();
        view.handle_input(InputCommand::LoadMore);
        view.handle_input(InputCommand::LoadMore);

        assert_eq!(
            view.session.transport().sent(),
            [r#"{"action":"loadMore","offset":0}"#.to_string()]
        );
    }

    #[test]
    fn quit_closes_transport_and_blocks_further_sends() {
        let mut view = view();
        view.handle_input(InputCommand::Quit);
        view.handle_input(InputCommand::Say("still there?".to_string()));

        assert!(!view.session.is_connected());
        assert!(view.session.transport().sent().is_empty());
        assert_eq!(view.compose.input(), "still there?");
    }
}
