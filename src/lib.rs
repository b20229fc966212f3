//! Streaming chat client for the CV screener backend.
//!
//! ## Backend bootstrap
//!
//! `screener_chat` requires explicit backend selection:
//!
//! - `SCREENER_BACKEND=mock` for a deterministic local backend
//! - `SCREENER_BACKEND=http` for the real screener transport
//!
//! When `SCREENER_BACKEND=http`, `SCREENER_BASE_URL` overrides the default
//! endpoint base (`http://127.0.0.1:8000/api`). `SCREENER_STATE_DIR`
//! overrides where the session identity file lives (defaults to the
//! current directory).
//!
//! ## Engine contract
//!
//! The conversation engine is single-threaded and cooperative: one run at a
//! time per controller, stream events folded into the transcript strictly
//! in arrival order, and exactly one live cancellation handle. Voluntary
//! cancellation never produces user-visible error text; only a genuine
//! submission or stream failure finalizes the open assistant message with
//! an error string.

pub mod app;
pub mod commands;
pub mod controller;
pub mod provider;
pub mod providers;
pub mod session;
pub mod transcript;
