use crate::session::ChatSession;
use crate::transport::Transport;

/// Input field state for writing messages.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Compose {
    input: String,
}

impl Compose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    /// Sends the input as a broadcast. Clears the field only if the session accepted it.
    ///
    /// The message shows up in the list once the server echoes it back.
    pub fn submit<T: Transport>(&mut self, session: &mut ChatSession<T>) -> bool {
        if !session.request_broadcast(&self.input) {
            return false;
        }

        self.input.clear();
        true
    }
}
