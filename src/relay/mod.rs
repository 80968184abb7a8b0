//! Duplex relay core
//!
//! This module wires one client WebSocket to one upstream realtime
//! connection:
//! - `session` orchestrates the forwarding tasks and teardown
//! - `scheduler` periodically flushes the upstream input buffer
//! - `activity` tracks whether client audio is still flowing
//! - `normalizer` reduces raw upstream events to client-facing transcript
//!   state with correct partial/final and delta semantics
//! - `messages` defines the client-facing protocol frames

pub mod activity;
pub mod messages;
pub mod normalizer;
pub mod scheduler;
pub mod session;

pub use activity::ActivityTracker;
pub use messages::{AudioFormat, ClientMessage, TransportMode};
pub use normalizer::{normalize, NormalizedEvent};
pub use scheduler::{CommitScheduler, CommitTarget, SchedulerHandle};
pub use session::RelaySession;
