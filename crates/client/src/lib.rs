#![deny(unsafe_code)]

//! Terminal chat client with scroll-back history.

pub mod app;
pub mod error;
/// Layered settings persistence.
pub mod settings;
pub mod terminal;
pub mod websocket;

pub use app::{ChatView, InputCommand, run};
pub use error::{ClientError, ClientResult};
pub use settings::{ClientSettings, SettingsStore};
