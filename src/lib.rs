//! # NDX Options Monitor - Front Server
//!
//! Serves the built dashboard, reverse-proxies `/api` to the data backend and
//! supervises the backend process.
//!
//! ## Key Features
//!
//! - **Static assets**: Files from `frontend/dist`, with unknown paths falling
//!   back to `index.html` so client-side routing works.
//!
//! - **API proxy**: Every request under `/api` is forwarded verbatim to the
//!   backend (default `http://localhost:5000`). An unreachable backend yields a
//!   `500` with `{"error":"Backend API unavailable"}`.
//!
//! - **Backend supervision**: The backend is launched as a child process with
//!   inherited stdio. SIGINT/SIGTERM are forwarded to it before the server exits.
//!
//! - **Structured Logging**: Request tracing with `tower-http`.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Proxy handler and router configuration |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`shutdown`] | Termination signal handling |
//! | [`state`] | Application state management |
//! | [`supervisor`] | Backend child process supervision |
//!
//! ## Example Usage
//!
//! ```bash
//! # Defaults: 0.0.0.0:3000, backend `python backend/main.py` on port 5000
//! cargo run
//!
//! # Custom port and configuration file
//! PORT=8080 CONFIG_PATH=monitor.toml cargo run
//!
//! # Terminal dashboard against a running server
//! API_BASE=http://localhost:3000/api MONITOR_OPTION_TYPE=CALL cargo run --bin ndx-monitor
//! ```
//!
//! The dashboard logic itself (polling, filtering, statistics, table, chart)
//! lives in the `monitor-client` crate.

pub mod api;
pub mod config;
pub mod error;
pub mod shutdown;
pub mod state;
pub mod supervisor;
