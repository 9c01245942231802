//! Types and client-side logic shared by the web and terminal front ends
//! of the document Q&A service.
//!
//! Everything here must stay WASM compatible: no tokio, no filesystem.

// API client types and trait
pub mod api;
pub use api::{ApiClientConfig, ApiError, DocQaApi};

// Timing and display constants
pub mod protocol;

pub mod chat;
pub mod markdown_lite;

// The session view-state machine and its async driver
pub mod controller;
pub mod state;

pub use chat::{AnswerSource, ChatEntry, ChatLog, EntryBody, Role};
pub use controller::Controller;
pub use state::{Command, Phase, ViewState, Visibility};
