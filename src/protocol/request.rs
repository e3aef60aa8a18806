use crate::{Error, Result};
use crate::protocol::constants::MAX_TOPIC_LEN;

/// What the user asks to be matched on.
///
/// Immutable once built; the session keeps it only while a registration is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    /// Topic name
    topic: String,

    /// Number of participants wanted
    capacity: u32,
}

impl MatchRequest {
    /// Create a validated request
    pub fn new(topic: impl Into<String>, capacity: u32) -> Result<Self> {
        let request = MatchRequest {
            topic: topic.into(),
            capacity,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check topic length and capacity
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(Error::validation("Topic must not be empty"));
        }

        if self.topic.chars().count() > MAX_TOPIC_LEN {
            return Err(Error::validation(format!(
                "Topic must not exceed {} characters",
                MAX_TOPIC_LEN
            )));
        }

        if self.capacity == 0 {
            return Err(Error::validation("Capacity must be at least 1"));
        }

        Ok(())
    }

    /// Get topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Get capacity
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
