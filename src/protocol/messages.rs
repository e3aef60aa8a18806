use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::protocol::MatchRequest;

/// Body of the register call
#[derive(Debug, Serialize)]
pub struct RegisterBody<'a> {
    pub condition: Condition<'a>,
}

#[derive(Debug, Serialize)]
pub struct Condition<'a> {
    pub topic: &'a str,
    pub number: u32,
}

impl<'a> From<&'a MatchRequest> for RegisterBody<'a> {
    fn from(request: &'a MatchRequest) -> Self {
        RegisterBody {
            condition: Condition {
                topic: request.topic(),
                number: request.capacity(),
            },
        }
    }
}

/// Body of the argument-less POST calls
#[derive(Debug, Default, Serialize)]
pub struct EmptyBody {}

/// Query of the completion poll
#[derive(Debug, Serialize)]
pub struct CompletionQuery<'a> {
    pub room_id: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub is_registered: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnregisterResponse {
    pub is_unregistered: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmResponse {
    pub is_confirmed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelConfirmResponse {
    pub is_cancelled: bool,
}

/// Answer to one match poll
#[derive(Debug, Clone, Deserialize)]
pub struct MatchPoll {
    pub is_matched: bool,
    pub room_id: Option<String>,
    pub room_url: Option<String>,
}

impl MatchPoll {
    /// Room the user was matched into, if any.
    ///
    /// A positive answer without both room fields is a protocol violation.
    pub fn into_room(self) -> Result<Option<MatchedRoom>> {
        if !self.is_matched {
            return Ok(None);
        }

        match (self.room_id, self.room_url) {
            (Some(room_id), Some(room_url)) if !room_id.is_empty() => {
                Ok(Some(MatchedRoom { room_id, room_url }))
            }
            _ => Err(Error::protocol("Match reported without room_id/room_url")),
        }
    }
}

/// Room assigned by the service once a match is found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoom {
    pub room_id: String,
    pub room_url: String,
}

/// Answer to one completion poll
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionPoll {
    pub is_completed: bool,
    pub is_cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSignal {
    /// Every participant confirmed
    Completed,

    /// Some participant withdrew
    Cancelled,
}

impl CompletionPoll {
    /// Decisive signal carried by this poll; cancellation wins over completion
    pub fn signal(&self) -> Option<CompletionSignal> {
        if self.is_cancelled {
            Some(CompletionSignal::Cancelled)
        } else if self.is_completed {
            Some(CompletionSignal::Completed)
        } else {
            None
        }
    }
}
