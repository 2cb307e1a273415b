//! Typed client for the Echo API.
//!
//! Besides the HTTP wrapper this crate holds the client-side state the web
//! front end keeps: the authenticated [`session::Session`], list and kanban
//! view state, and the debounced auto-saver used by the request editor.

pub mod api;
pub mod autosave;
pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod views;

pub use api::EchoApi;
pub use config::ClientConfig;
pub use error::ClientError;
