mod config;
mod http;

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use http::HttpMatchService;

use crate::Result;
use crate::protocol::{
    CancelConfirmResponse, CompletionPoll, ConfirmResponse, MatchPoll, MatchRequest,
    RegisterResponse, Topic, UnregisterResponse,
};

/// The remote matchmaking authority.
///
/// Each call is one request/response exchange. Implementations keep no local
/// state and never retry; any failure is reported as-is to the caller.
#[async_trait::async_trait]
pub trait MatchService: Send + Sync {
    /// Enter the matching pool
    async fn register(&self, request: &MatchRequest) -> Result<RegisterResponse>;

    /// Leave the matching pool
    async fn unregister(&self) -> Result<UnregisterResponse>;

    /// Ask whether a room has been assigned
    async fn poll_for_match(&self) -> Result<MatchPoll>;

    /// Accept the assigned room
    async fn confirm(&self) -> Result<ConfirmResponse>;

    /// Withdraw a previous confirmation
    async fn cancel_confirm(&self) -> Result<CancelConfirmResponse>;

    /// Ask whether every participant of the room confirmed
    async fn poll_for_completion(&self, room_id: &str) -> Result<CompletionPoll>;
}

/// Topic catalogue used to pick what to match on
#[async_trait::async_trait]
pub trait TopicService: Send + Sync {
    async fn popular_topics(&self) -> Result<Vec<Topic>>;

    /// Blank queries return an empty list without contacting the service
    async fn search_topics(&self, text: &str) -> Result<Vec<Topic>>;

    /// Returns false when a topic with that name already exists
    async fn create_topic(&self, name: &str) -> Result<bool>;
}
