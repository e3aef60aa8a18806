use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Not registered for matching
    Idle,

    /// Register call in flight
    Registering,

    /// In the pool, polling for a room
    WaitingForMatch,

    /// Room assigned, confirmation window open
    ConfirmPending,

    /// Confirmed, waiting for the other participants
    WaitingForPeer,

    /// Everyone confirmed, room ready
    Completed,

    /// Service sent something unusable; cleared by quit
    Failed,
}

impl SessionState {
    /// Check if a new request may be started
    pub fn can_start(&self) -> bool {
        *self == SessionState::Idle
    }

    /// Check if the user is somewhere in the matching flow
    pub fn is_matching(&self) -> bool {
        matches!(self,
            SessionState::Registering |
            SessionState::WaitingForMatch |
            SessionState::ConfirmPending |
            SessionState::WaitingForPeer)
    }

    /// Check if a room is attached
    pub fn has_room(&self) -> bool {
        matches!(self,
            SessionState::ConfirmPending |
            SessionState::WaitingForPeer |
            SessionState::Completed)
    }

    /// Validate transition
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;

        match (*self, next) {
            (_, Idle) => true,
            (Idle, Registering) => true,
            (Registering, WaitingForMatch) => true,
            (WaitingForMatch, ConfirmPending) => true,
            (ConfirmPending, WaitingForPeer) => true,
            (WaitingForPeer, Completed) => true,
            (WaitingForPeer, WaitingForMatch) => true,
            (state, Failed) => state.is_matching(),
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Registering => "registering",
            SessionState::WaitingForMatch => "waiting-for-match",
            SessionState::ConfirmPending => "confirm-pending",
            SessionState::WaitingForPeer => "waiting-for-peer",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}
