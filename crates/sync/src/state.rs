use backscroll_protocol::{Batch, Inbound, Request, encode_request};

/// Pagination flags for one chat session.
///
/// Together with the materialized message count this is the whole synchronizer
/// state; every change goes through [`SyncState::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncState {
    /// Set once a history request came back empty. Never cleared except by reset.
    pub history_exhausted: bool,
    /// A `loadMore` request is outstanding.
    pub request_in_flight: bool,
    /// The terminal connection notice was already rendered.
    pub closed_notice_shown: bool,
}

/// Environment snapshot the transition depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncContext {
    pub connected: bool,
    /// Messages currently in the render list; doubles as the pagination offset.
    pub materialized: usize,
    /// Largest encoded frame the server reads before dropping the connection.
    pub max_message_bytes: usize,
}

/// How a reconnection should treat the exhaustion flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetPolicy {
    /// Only worth setting when the server-side history could have grown.
    pub clear_history_exhausted: bool,
}

/// Inputs to the synchronizer state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Opened,
    HistoryRequested,
    BroadcastRequested(String),
    Received(Inbound),
    ConnectionLost,
    Reset(ResetPolicy),
}

/// User-visible status lines that are not chat messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    ConnectionClosed,
    ConnectFailed,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Self::ConnectionClosed => "Connection closed.",
            Self::ConnectFailed => "Could not connect to the chat server.",
        }
    }
}

/// Side effects a transition asks the session to carry out, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Send(Request),
    /// Insert at the historical end, one message at a time in batch order.
    Prepend(Batch),
    /// Insert at the live end in batch order.
    Append(Batch),
    Notice(Notice),
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SyncState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: SyncState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    fn with_effect(state: SyncState, effect: Effect) -> Self {
        Self {
            state,
            effects: vec![effect],
        }
    }

    /// True when the event was a no-op.
    pub fn is_noop(&self, previous: &SyncState) -> bool {
        self.effects.is_empty() && self.state == *previous
    }
}

impl SyncState {
    /// Returns true when a history request would currently be sent.
    pub fn can_request_history(&self, connected: bool) -> bool {
        connected && !self.history_exhausted && !self.request_in_flight
    }

    /// Applies one event deterministically.
    ///
    /// Unmet preconditions produce an empty transition instead of an error, so callers
    /// may fire requests speculatively.
    pub fn apply(&self, event: SyncEvent, context: SyncContext) -> Transition {
        match event {
            SyncEvent::Opened | SyncEvent::HistoryRequested => self.apply_history_request(context),
            SyncEvent::BroadcastRequested(text) => self.apply_broadcast(text, context),
            SyncEvent::Received(inbound) => self.apply_received(inbound),
            SyncEvent::ConnectionLost => self.apply_connection_lost(),
            SyncEvent::Reset(policy) => self.apply_reset(policy),
        }
    }

    fn apply_history_request(&self, context: SyncContext) -> Transition {
        if !self.can_request_history(context.connected) {
            return Transition::unchanged(*self);
        }

        let next = Self {
            request_in_flight: true,
            ..*self
        };
        Transition::with_effect(next, Effect::Send(Request::load_more(context.materialized)))
    }

    fn apply_broadcast(&self, text: String, context: SyncContext) -> Transition {
        if !context.connected || text.trim().is_empty() {
            return Transition::unchanged(*self);
        }

        let request = Request::broadcast(text);
        // JSON escaping can grow the frame well past the text length.
        let fits = encode_request(&request)
            .is_ok_and(|frame| frame.len() <= context.max_message_bytes);
        if !fits {
            return Transition::unchanged(*self);
        }

        Transition::with_effect(*self, Effect::Send(request))
    }

    fn apply_received(&self, inbound: Inbound) -> Transition {
        match inbound {
            Inbound::HistoryExhausted => Transition::unchanged(Self {
                history_exhausted: true,
                request_in_flight: false,
                ..*self
            }),
            Inbound::History(batch) => Transition::with_effect(
                Self {
                    request_in_flight: false,
                    ..*self
                },
                Effect::Prepend(batch),
            ),
            Inbound::Live(batch) if batch.is_empty() => Transition::unchanged(*self),
            Inbound::Live(batch) => Transition::with_effect(*self, Effect::Append(batch)),
        }
    }

    fn apply_connection_lost(&self) -> Transition {
        if self.closed_notice_shown {
            return Transition::unchanged(*self);
        }

        // The in-flight flag stays set: there is no retry, only an external reset.
        Transition::with_effect(
            Self {
                closed_notice_shown: true,
                ..*self
            },
            Effect::Notice(Notice::ConnectionClosed),
        )
    }

    fn apply_reset(&self, policy: ResetPolicy) -> Transition {
        Transition::unchanged(Self {
            history_exhausted: self.history_exhausted && !policy.clear_history_exhausted,
            request_in_flight: false,
            closed_notice_shown: false,
        })
    }
}
