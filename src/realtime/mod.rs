//! Upstream link to the remote realtime transcription service
//!
//! One `RealtimeClient` exists per relay session; it owns the outbound
//! WebSocket connection and exposes the append / commit / control / receive
//! primitives the relay core builds on.

pub mod client;
pub mod events;

pub use client::{CommitError, ConnectError, RealtimeClient, RealtimeError, MIN_COMMIT_BYTES};
pub use events::{ClientEvent, ResponseSpec, ServerEvent};
