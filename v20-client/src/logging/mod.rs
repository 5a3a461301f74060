//! Logging setup for applications embedding the client.
//!
//! The client itself only emits `tracing` events; installing a subscriber is
//! left to the application. [`init_logging`] installs one configured from the
//! environment:
//!
//! - `RUST_LOG`: standard filter directives (`info`, `v20_client=debug`)
//! - `LOG_FORMAT`: `pretty` (default), `compact` or `json`
//! - `LOG_TIMESTAMPS`: `local` (default), `utc` or `none`
//! - `LOG_LEVEL`: fallback level when `RUST_LOG` is unset
//!
//! ```rust,ignore
//! use v20_client::logging::{init_logging, LogConfig};
//!
//! init_logging(LogConfig::from_env())?;
//! ```
//!
//! Access tokens are never part of any event.

mod config;

pub use config::{init_logging, LogConfig, LogFormat, TimestampFormat};
