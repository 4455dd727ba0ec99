//! http-echo is a small HTTP server that answers every request with a
//! configured text and status code, and writes one structured access
//! record per request.
//!
//! Handlers use a writer model: they receive a
//! [`ResponseWriter`](handler::ResponseWriter) and drive it. That lets the
//! access-log middleware swap in a capturing proxy and observe the final
//! status and payload length without changing a byte on the wire.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`config`] -- Validated runtime configuration built from the CLI.
//! - [`echo`] -- The echo handler.
//! - [`error`] -- Unified error type using `thiserror`.
//! - [`handler`] -- Writer-style handler traits, request context, and the
//!   axum adapter.
//! - [`health`] -- `GET /health` handler.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- Identity headers, response capture, and access logging.
//! - [`response`] -- Buffered response sink converted into an axum response.
//! - [`run`] -- Startup: config, logging, listener, graceful shutdown.
//! - [`server`] -- Router construction and shutdown signal handling.
//! - [`version`] -- Build metadata and the application identity.

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod echo;
pub mod error;
pub mod handler;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod run;
pub mod server;
pub mod version;
