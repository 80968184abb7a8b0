pub mod config;
pub mod http;
pub mod inspect;
pub mod realtime;
pub mod relay;

pub use config::Config;
pub use http::{create_router, AppState};
pub use inspect::{InspectStore, SessionSummary, SessionTrace};
pub use realtime::{
    ClientEvent, CommitError, ConnectError, RealtimeClient, RealtimeError, ServerEvent,
};
pub use relay::{
    normalize, ActivityTracker, ClientMessage, CommitScheduler, CommitTarget, NormalizedEvent,
    RelaySession, SchedulerHandle, TransportMode,
};
