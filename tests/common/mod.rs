// Shared test doubles
//
// ScriptedService plays back queued responses per operation and counts calls;
// spawn_json_server is an axum app that answers from a route table for adapter tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use roommatch::*;
use tokio::net::TcpListener;

/// How often each operation was called
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calls {
    pub register: usize,
    pub unregister: usize,
    pub poll_match: usize,
    pub confirm: usize,
    pub cancel_confirm: usize,
    pub poll_completion: usize,
}

/// In-memory MatchService with scripted replies.
///
/// When a queue runs dry the service answers with the "nothing happened"
/// response for that operation.
#[derive(Default)]
pub struct ScriptedService {
    register: Mutex<VecDeque<Result<RegisterResponse>>>,
    poll_match: Mutex<VecDeque<Result<MatchPoll>>>,
    confirm: Mutex<VecDeque<Result<ConfirmResponse>>>,
    cancel_confirm: Mutex<VecDeque<Result<CancelConfirmResponse>>>,
    poll_completion: Mutex<VecDeque<Result<CompletionPoll>>>,
    completion_rooms: Mutex<Vec<String>>,
    calls: Mutex<Calls>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(ScriptedService::default())
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    pub fn completion_rooms(&self) -> Vec<String> {
        self.completion_rooms.lock().unwrap().clone()
    }

    pub fn push_register(&self, reply: Result<RegisterResponse>) {
        self.register.lock().unwrap().push_back(reply);
    }

    pub fn push_poll_match(&self, reply: Result<MatchPoll>) {
        self.poll_match.lock().unwrap().push_back(reply);
    }

    pub fn push_confirm(&self, reply: Result<ConfirmResponse>) {
        self.confirm.lock().unwrap().push_back(reply);
    }

    pub fn push_cancel_confirm(&self, reply: Result<CancelConfirmResponse>) {
        self.cancel_confirm.lock().unwrap().push_back(reply);
    }

    pub fn push_poll_completion(&self, reply: Result<CompletionPoll>) {
        self.poll_completion.lock().unwrap().push_back(reply);
    }

    fn count(&self, f: impl FnOnce(&mut Calls)) {
        f(&mut self.calls.lock().unwrap());
    }
}

pub fn registered(ok: bool) -> Result<RegisterResponse> {
    Ok(RegisterResponse { is_registered: ok })
}

pub fn not_matched() -> Result<MatchPoll> {
    Ok(MatchPoll { is_matched: false, room_id: None, room_url: None })
}

pub fn matched(room_id: &str, room_url: &str) -> Result<MatchPoll> {
    Ok(MatchPoll {
        is_matched: true,
        room_id: Some(room_id.to_string()),
        room_url: Some(room_url.to_string()),
    })
}

pub fn completion(is_completed: bool, is_cancelled: bool) -> Result<CompletionPoll> {
    Ok(CompletionPoll { is_completed, is_cancelled })
}

#[async_trait::async_trait]
impl MatchService for ScriptedService {
    async fn register(&self, _request: &MatchRequest) -> Result<RegisterResponse> {
        self.count(|c| c.register += 1);
        self.register.lock().unwrap().pop_front().unwrap_or(registered(true))
    }

    async fn unregister(&self) -> Result<UnregisterResponse> {
        self.count(|c| c.unregister += 1);
        Ok(UnregisterResponse { is_unregistered: true })
    }

    async fn poll_for_match(&self) -> Result<MatchPoll> {
        self.count(|c| c.poll_match += 1);
        self.poll_match.lock().unwrap().pop_front().unwrap_or_else(not_matched)
    }

    async fn confirm(&self) -> Result<ConfirmResponse> {
        self.count(|c| c.confirm += 1);
        self.confirm
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ConfirmResponse { is_confirmed: true }))
    }

    async fn cancel_confirm(&self) -> Result<CancelConfirmResponse> {
        self.count(|c| c.cancel_confirm += 1);
        self.cancel_confirm
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(CancelConfirmResponse { is_cancelled: true }))
    }

    async fn poll_for_completion(&self, room_id: &str) -> Result<CompletionPoll> {
        self.count(|c| c.poll_completion += 1);
        self.completion_rooms.lock().unwrap().push(room_id.to_string());
        self.poll_completion
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| completion(false, false))
    }
}

/// Request as seen by the stub server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Canned answer for requests whose path ends with `suffix`
#[derive(Debug, Clone)]
pub struct Route {
    pub suffix: &'static str,
    pub status: u16,
    pub body: &'static str,
}

pub fn route(suffix: &'static str, status: u16, body: &'static str) -> Route {
    Route { suffix, status, body }
}

#[derive(Clone)]
struct Stub {
    routes: Arc<Vec<Route>>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Answer every request from the route table, logging what arrived
async fn answer(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let request = RecordedRequest {
        method: method.as_str().to_string(),
        target: uri.path_and_query().map_or_else(|| uri.path().to_string(), |pq| pq.to_string()),
        headers: headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
            .collect(),
        body,
    };

    let (status, body) = stub
        .routes
        .iter()
        .find(|r| request.path().ends_with(r.suffix))
        .map(|r| (r.status, r.body))
        .unwrap_or((404, "{}"));
    stub.log.lock().unwrap().push(request);

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

/// Start a stub JSON server; returns its base URL and the request log
pub async fn spawn_json_server(routes: Vec<Route>) -> (String, Arc<Mutex<Vec<RecordedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    let log = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new().fallback(answer).with_state(Stub {
        routes: Arc::new(routes),
        log: log.clone(),
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}/chatrooms/", addr), log)
}
