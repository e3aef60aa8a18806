mod config;
mod events;
mod session;
mod state;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use events::{EventReceiver, SessionEvent};
pub use session::{MatchmakingSession, TimerEvent};
pub use state::SessionState;
