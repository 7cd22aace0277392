//! wsflood Core Library
//!
//! Core types for the wsflood WebSocket load generator: the session
//! driver, run orchestration, named checks, and event sinks. This crate
//! is independent of the CLI front-end.
//!
//! # Modules
//!
//! - [`config`] - Run configuration and per-session random draws
//! - [`message`] - The outbound `SAY` message model
//! - [`session`] - Session driver: connect, periodic send, timed close
//! - [`runner`] - Bounded-concurrency execution of many sessions
//! - [`check`] - Named pass/fail assertions recorded for reporting
//! - [`events`] - Event sink trait for per-session observability
//! - [`error`] - Error types

pub mod check;
pub mod config;
pub mod error;
pub mod events;
pub mod message;
pub mod runner;
pub mod session;

// Re-export commonly used types
pub use check::{CheckSet, CheckStats};
pub use config::{DrawRange, RunConfig};
pub use error::{Result, SessionError};
pub use events::{EventSink, MemoryEventSink, NoOpEventSink, SessionEvent, StdoutEventSink};
pub use message::Outbound;
pub use runner::{RunSummary, Runner};
pub use session::{
    run_session, SessionContext, SessionOutcome, SessionPlan, SessionState, CONNECTED_CHECK,
};
