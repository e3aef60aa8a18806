use std::sync::Arc;
use log::debug;
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;
use crate::{Error, Result};
use crate::protocol::*;
use crate::service::{MatchService, ServiceConfig, TopicService};

/// `MatchService` over the service's JSON HTTP API
pub struct HttpMatchService {
    /// Service configuration
    config: Arc<ServiceConfig>,

    /// Shared HTTP client
    http: reqwest::Client,
}

impl HttpMatchService {
    /// Create new adapter
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(HttpMatchService {
            config: Arc::new(config),
            http,
        })
    }

    /// Get service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.config.base_url.join(path)?)
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        self.send(self.http.get(url)).await
    }

    async fn get_with_query<Q, R>(&self, path: &str, query: &Q) -> Result<R>
    where
        Q: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        self.send(self.http.get(url).query(query)).await
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.config.csrf_token {
            request = request.header(self.config.csrf_header.as_str(), token.as_str());
        }
        self.send(request).await
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("Request failed: {}", e)))?;
        Self::decode(response).await
    }

    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
        let status = response.status();
        let url = response.url().clone();

        if !status.is_success() {
            return Err(Error::transport(format!("{} returned {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Failed to read body from {}: {}", url, e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::protocol(format!("Unexpected response from {}: {}", url, e)))
    }
}

#[async_trait::async_trait]
impl MatchService for HttpMatchService {
    async fn register(&self, request: &MatchRequest) -> Result<RegisterResponse> {
        self.post(PATH_REGISTER, &RegisterBody::from(request)).await
    }

    async fn unregister(&self) -> Result<UnregisterResponse> {
        self.post(PATH_UNREGISTER, &EmptyBody::default()).await
    }

    async fn poll_for_match(&self) -> Result<MatchPoll> {
        self.get(PATH_POLL_MATCH).await
    }

    async fn confirm(&self) -> Result<ConfirmResponse> {
        self.post(PATH_CONFIRM, &EmptyBody::default()).await
    }

    async fn cancel_confirm(&self) -> Result<CancelConfirmResponse> {
        self.post(PATH_CANCEL_CONFIRM, &EmptyBody::default()).await
    }

    async fn poll_for_completion(&self, room_id: &str) -> Result<CompletionPoll> {
        let query = CompletionQuery { room_id };
        self.get_with_query(PATH_POLL_COMPLETION, &query).await
    }
}

#[async_trait::async_trait]
impl TopicService for HttpMatchService {
    async fn popular_topics(&self) -> Result<Vec<Topic>> {
        let list: TopicList = self.get(PATH_POPULAR_TOPICS).await?;
        Ok(list.topics)
    }

    async fn search_topics(&self, text: &str) -> Result<Vec<Topic>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query = SearchQuery { search_text: text };
        let list: TopicList = self.get_with_query(PATH_SEARCH_TOPICS, &query).await?;
        Ok(list.topics)
    }

    async fn create_topic(&self, name: &str) -> Result<bool> {
        let name = normalize_topic_name(name)?;
        let response: CreateTopicResponse =
            self.post(PATH_CREATE_TOPIC, &CreateTopicBody { name }).await?;
        Ok(response.is_created)
    }
}
