use crate::session::ChatSession;
use crate::transport::Transport;

/// Scroll metrics of a surface that lays messages out newest-first.
///
/// `scroll_top` is zero at the live end and grows negative toward older messages,
/// as in a reversed flex column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollGeometry {
    pub scroll_height: f32,
    pub scroll_top: f32,
    pub client_height: f32,
}

impl ScrollGeometry {
    pub fn new(scroll_height: f32, scroll_top: f32, client_height: f32) -> Self {
        Self {
            scroll_height,
            scroll_top,
            client_height,
        }
    }

    /// How far the viewport is from the oldest rendered message.
    pub fn distance_to_history_edge(&self) -> f32 {
        (self.scroll_height + self.scroll_top - self.client_height).max(0.0)
    }
}

/// Requests older messages when the viewport nears the historical end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrigger {
    threshold: f32,
}

impl ScrollTrigger {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Feeds one proximity sample. Returns true when a history request went out.
    ///
    /// Safe to call on every scroll event: the session suppresses requests while one
    /// is in flight, and the trigger goes quiet for good once history is exhausted.
    pub fn on_proximity<T: Transport>(&self, distance: f32, session: &mut ChatSession<T>) -> bool {
        if session.state().history_exhausted {
            return false;
        }
        if distance > self.threshold {
            return false;
        }

        session.request_history()
    }

    pub fn on_scroll<T: Transport>(
        &self,
        geometry: ScrollGeometry,
        session: &mut ChatSession<T>,
    ) -> bool {
        self.on_proximity(geometry.distance_to_history_edge(), session)
    }
}
