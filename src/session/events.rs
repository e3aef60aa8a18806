use tokio::sync::mpsc;
use crate::session::SessionState;

/// Things the owning view should react to
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// State machine moved
    StateChanged { from: SessionState, to: SessionState },

    /// Short-lived message for the user
    Notice(String),

    /// Remaining confirmation window, 100 down to 0
    Countdown(f64),

    /// Room is ready; the view should navigate there
    Navigate { room_url: String },
}

pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;
