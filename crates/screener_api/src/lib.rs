//! Transport-only client primitives for the CV screener backend.
//!
//! This crate owns request/response building and parsing for the screener
//! HTTP endpoints plus the run event feed only. It intentionally contains no
//! transcript state and no UI coupling; those live in the application crate.
//!
//! The event feed is a blank-line delimited text stream with `event:`,
//! `data:` and `id:` field lines. Decoding is split in two layers:
//! [`SseFrameParser`] turns arbitrarily-chunked bytes into [`SseFrame`]
//! values, and [`interpret_frame`] maps one frame into a typed
//! [`RunStreamEvent`]. Malformed frame payloads degrade to field defaults so
//! a single bad frame never aborts a stream.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::CancellationSignal;
pub use client::ScreenerApiClient;
pub use config::ScreenerApiConfig;
pub use error::ScreenerApiError;
pub use events::{interpret_frame, RunStreamEvent};
pub use payload::{
    CreateThreadResponse, CreateUserResponse, PostMessageResponse, RunResponse, RunStatus,
    ThreadMessage, ThreadResponse,
};
pub use sse::{SseFrame, SseFrameParser};
pub use url::normalize_base_url;
