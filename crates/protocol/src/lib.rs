#![deny(unsafe_code)]

//! JSON wire protocol spoken between the chat client and server.

pub mod error;
pub mod inbound;
pub mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use inbound::{BatchKind, Inbound, parse_inbound};
pub use types::{
    BROADCAST_ACTION, Batch, ChatMessage, LOAD_MORE_ACTION, Request, Username, encode_request,
};
