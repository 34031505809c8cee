#![deny(unsafe_code)]

//! Chat stream synchronization.
//!
//! Merges live pushes and paginated history into one chronologically ordered list,
//! guarding history requests so at most one is outstanding and none follow exhaustion.

pub mod compose;
pub mod config;
pub mod render;
pub mod scroll;
/// Event loop facing context object.
pub mod session;
/// Deterministic pagination state machine.
pub mod state;
pub mod transport;

pub use compose::Compose;
pub use config::{Clock, SyncConfig};
pub use render::{AuthorStyle, MessageFormatter, NullSink, RenderList, RenderSink, RenderedMessage};
pub use scroll::{ScrollGeometry, ScrollTrigger};
pub use session::{ChatSession, SessionHooks};
pub use state::{Effect, Notice, ResetPolicy, SyncContext, SyncEvent, SyncState, Transition};
pub use transport::{MemoryTransport, Transport, TransportError, TransportEvent, TransportResult};
