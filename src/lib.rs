mod utils;
mod protocol;
mod service;
mod timer;
mod session;

// Re-export commonly used types at crate root
pub use utils::*;
pub use protocol::*;

// Service exports
pub use service::{HttpMatchService, MatchService, ServiceConfig, ServiceConfigBuilder, TopicService};

// Timer exports
pub use timer::{Countdown, DeadlineTimer, Poller, ProbeOutcome};

// Session exports
pub use session::{
    EventReceiver, MatchmakingSession, SessionConfig, SessionConfigBuilder, SessionEvent,
    SessionState, TimerEvent,
};
