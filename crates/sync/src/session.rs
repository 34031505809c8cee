use backscroll_protocol::{BatchKind, Request, Username, encode_request, parse_inbound};

use crate::config::SyncConfig;
use crate::render::{MessageFormatter, NullSink, RenderList, RenderSink, RenderedMessage};
use crate::state::{Effect, ResetPolicy, SyncContext, SyncEvent, SyncState};
use crate::transport::{Transport, TransportEvent};

/// Observers for outbound requests and rendered batches.
///
/// Meant for collaborators such as a reconnection or persistence layer. All methods
/// default to no-ops.
pub trait SessionHooks {
    fn load_more_requested(&mut self, _offset: usize) {}
    fn broadcast_requested(&mut self, _message: &str) {}
    fn batch_ready(&mut self, _kind: BatchKind, _records: &[RenderedMessage]) {}
}

/// Everything one chat view needs: transport, pagination state and the message list.
///
/// Construct one per view. All handlers run to completion and are expected to be
/// called from a single event loop, in arrival order.
pub struct ChatSession<T> {
    transport: T,
    state: SyncState,
    list: RenderList,
    formatter: MessageFormatter,
    config: SyncConfig,
    sink: Box<dyn RenderSink>,
    hooks: Vec<Box<dyn SessionHooks>>,
}

impl<T: Transport> ChatSession<T> {
    pub fn new(transport: T, viewer: Username, config: SyncConfig) -> Self {
        let config = config.normalized();
        let formatter = MessageFormatter::new(viewer, config.time_format.clone(), config.clock);
        Self {
            transport,
            state: SyncState::default(),
            list: RenderList::new(),
            formatter,
            config,
            sink: Box::new(NullSink),
            hooks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: impl RenderSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn add_hooks(&mut self, hooks: impl SessionHooks + 'static) {
        self.hooks.push(Box::new(hooks));
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Pagination cursor: how many messages are materialized.
    pub fn offset(&self) -> usize {
        self.list.len()
    }

    pub fn render_list(&self) -> &RenderList {
        &self.list
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Routes one transport event to its handler.
    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Frame(frame) => self.on_frame(&frame),
            TransportEvent::Closed => self.on_closed(),
        }
    }

    /// Seeds the view with the first page of history.
    pub fn on_open(&mut self) {
        tracing::info!("chat transport opened");
        self.dispatch(SyncEvent::Opened);
    }

    /// Parses, classifies and renders one inbound frame. Malformed frames are dropped.
    pub fn on_frame(&mut self, frame: &str) {
        let inbound = match parse_inbound(frame) {
            Ok(inbound) => inbound,
            Err(error) => {
                tracing::warn!("dropping malformed inbound frame: {}", error);
                return;
            }
        };

        tracing::debug!(kind = ?inbound.kind(), messages = inbound.len(), "inbound batch");
        self.dispatch(SyncEvent::Received(inbound));
    }

    pub fn on_closed(&mut self) {
        tracing::info!(
            request_in_flight = self.state.request_in_flight,
            "chat transport closed"
        );
        self.transport.close();
        self.dispatch(SyncEvent::ConnectionLost);
    }

    /// Asks for the next page of older messages. Returns false when suppressed.
    pub fn request_history(&mut self) -> bool {
        self.dispatch(SyncEvent::HistoryRequested)
    }

    /// Asks the server to broadcast `text`. Returns false when rejected locally.
    pub fn request_broadcast(&mut self, text: &str) -> bool {
        self.dispatch(SyncEvent::BroadcastRequested(text.to_string()))
    }

    /// Prepares the session for reuse on a fresh connection.
    pub fn reset(&mut self, policy: ResetPolicy) {
        self.dispatch(SyncEvent::Reset(policy));
    }

    // Returns true when at least one outbound frame was handed to the transport.
    fn dispatch(&mut self, event: SyncEvent) -> bool {
        let previous = self.state;
        let context = SyncContext {
            connected: self.transport.is_connected(),
            materialized: self.list.len(),
            max_message_bytes: self.config.max_message_bytes,
        };
        let transition = self.state.apply(event, context);
        self.state = transition.state;

        let mut sent = false;
        for effect in transition.effects {
            match effect {
                Effect::Send(request) => {
                    if self.send(&request) {
                        sent = true;
                    } else {
                        // Nothing went out, so nothing is in flight.
                        self.state = previous;
                    }
                }
                Effect::Prepend(batch) => {
                    let mut records = Vec::with_capacity(batch.len());
                    for message in &batch {
                        let record = self.list.prepend(self.formatter.format(message));
                        self.sink.insert_oldest(record);
                        records.push(record.clone());
                    }
                    for hooks in &mut self.hooks {
                        hooks.batch_ready(BatchKind::History, &records);
                    }
                }
                Effect::Append(batch) => {
                    let mut records = Vec::with_capacity(batch.len());
                    for message in &batch {
                        let record = self.list.append(self.formatter.format(message));
                        self.sink.insert_newest(record);
                        records.push(record.clone());
                    }
                    for hooks in &mut self.hooks {
                        hooks.batch_ready(BatchKind::Live, &records);
                    }
                }
                Effect::Notice(notice) => self.sink.notice(notice),
            }
        }

        if self.state.history_exhausted && !previous.history_exhausted {
            tracing::info!(offset = self.list.len(), "message history exhausted");
        }

        sent
    }

    fn send(&mut self, request: &Request) -> bool {
        let frame = match encode_request(request) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!("failed to encode {} request: {}", request.action(), error);
                return false;
            }
        };

        if let Err(error) = self.transport.send(frame) {
            tracing::warn!("failed to send {} request: {}", request.action(), error);
            return false;
        }

        tracing::debug!(action = request.action(), "request sent");
        match request {
            Request::LoadMore { offset } => {
                for hooks in &mut self.hooks {
                    hooks.load_more_requested(*offset as usize);
                }
            }
            Request::Broadcast { message } => {
                for hooks in &mut self.hooks {
                    hooks.broadcast_requested(message);
                }
            }
        }
        true
    }
}
