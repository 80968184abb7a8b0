//! HTTP server surface
//!
//! - GET /healthz - readiness probe
//! - GET /ws?mode=json|text - WebSocket upgrade into a relay session
//! - GET /sessions - summaries of recently relayed sessions
//! - GET /sessions/:id - full per-session trace

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
