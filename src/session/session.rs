use std::sync::Arc;
use std::time::Duration;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;
use crate::{Error, Result};
use crate::protocol::{CompletionSignal, MatchPoll, MatchRequest, MatchedRoom};
use crate::service::MatchService;
use crate::session::config::SessionConfig;
use crate::session::events::{EventReceiver, SessionEvent};
use crate::session::state::SessionState;
use crate::timer::{DeadlineTimer, Poller, ProbeOutcome};

/// Message posted by a timer into the session inbox
#[derive(Debug)]
enum Wakeup {
    MatchFound(Result<MatchedRoom>),
    PeerSignal(Result<CompletionSignal>),
    ConfirmWindowClosed,
    MatchTimedOut,
}

/// A timer firing, tagged with the timer generation that produced it.
///
/// Obtained from [`MatchmakingSession::next_timer_event`] and handed back to
/// [`MatchmakingSession::handle_timer_event`].
#[derive(Debug)]
pub struct TimerEvent {
    generation: u64,
    wakeup: Wakeup,
}

/// Client side of the matchmaking handshake.
///
/// Single owner, driven through `&mut self`: user actions are the async methods
/// (`start`, `confirm`, `decline`, `cancel`, `quit`), timer firings arrive through
/// `process_next` (or `next_timer_event` + `handle_timer_event` when selecting
/// against other input). Every timer carries the generation it was started
/// under; stopping timers bumps the generation, so firings that were already
/// queued or in flight are recognised as stale and dropped.
pub struct MatchmakingSession {
    /// Session identifier used in logs
    id: String,

    /// Session configuration
    config: Arc<SessionConfig>,

    /// Remote matchmaking service
    service: Arc<dyn MatchService>,

    /// Current state
    state: SessionState,

    /// Submitted request
    request: Option<MatchRequest>,

    /// Assigned room
    room: Option<MatchedRoom>,

    /// Last failure
    last_error: Option<Error>,

    /// Active poller
    poller: Option<Poller>,

    /// Active deadline
    deadline: Option<DeadlineTimer>,

    /// Bumped whenever timers are stopped
    generation: u64,

    /// Server may still hold a registration for us
    registration_pending: bool,

    /// Timer inbox
    inbox_tx: mpsc::UnboundedSender<TimerEvent>,
    inbox_rx: mpsc::UnboundedReceiver<TimerEvent>,

    /// Outgoing events
    events: mpsc::UnboundedSender<SessionEvent>,

    /// Set once close() ran
    closed: bool,
}

impl MatchmakingSession {
    /// Create new session in the idle state
    pub fn new(service: Arc<dyn MatchService>, config: SessionConfig) -> (Self, EventReceiver) {
        if let Err(e) = config.validate() {
            warn!("Session created with invalid config: {}", e);
        }

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (events, events_rx) = mpsc::unbounded_channel();

        let session = MatchmakingSession {
            id: Uuid::new_v4().to_string(),
            config: Arc::new(config),
            service,
            state: SessionState::Idle,
            request: None,
            room: None,
            last_error: None,
            poller: None,
            deadline: None,
            generation: 0,
            // Nothing is known about the server side yet
            registration_pending: true,
            inbox_tx,
            inbox_rx,
            events,
            closed: false,
        };

        (session, events_rx)
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Get submitted request
    pub fn request(&self) -> Option<&MatchRequest> {
        self.request.as_ref()
    }

    /// Get assigned room ID
    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|room| room.room_id.as_str())
    }

    /// Get assigned room URL
    pub fn room_url(&self) -> Option<&str> {
        self.room.as_ref().map(|room| room.room_url.as_str())
    }

    /// Get last failure
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Interval of the running poller, if any
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poller.as_ref().filter(|p| p.is_active()).map(|p| p.interval())
    }

    /// Check if a deadline is counting down
    pub fn has_active_deadline(&self) -> bool {
        self.deadline.as_ref().is_some_and(|d| d.is_active())
    }

    /// Register for matching
    pub async fn start(&mut self, request: MatchRequest) -> Result<SessionState> {
        if !self.state.can_start() {
            return Err(Error::invalid_state(format!("Cannot start while {}", self.state)));
        }
        request.validate()?;

        info!("[{}] Registering for '{}' (capacity {})", self.id, request.topic(), request.capacity());
        self.set_state(SessionState::Registering);
        self.registration_pending = true;

        match self.service.register(&request).await {
            Ok(response) if response.is_registered => {
                self.last_error = None;
                self.request = Some(request);
                self.wait_for_match();
            }
            Ok(_) => self.fail(Error::refused("Registration was not accepted")).await,
            Err(e) => self.fail(e).await,
        }

        Ok(self.state)
    }

    /// Accept the assigned room
    pub async fn confirm(&mut self) -> Result<SessionState> {
        if self.state != SessionState::ConfirmPending {
            return Err(Error::invalid_state(format!("Nothing to confirm while {}", self.state)));
        }

        info!("[{}] Confirming room {}", self.id, self.room_id().unwrap_or("?"));

        match self.service.confirm().await {
            Ok(response) if response.is_confirmed => {
                self.last_error = None;
                self.wait_for_peer().await;
            }
            Ok(_) => self.fail(Error::refused("Confirmation was not accepted")).await,
            Err(e) => self.fail(e).await,
        }

        Ok(self.state)
    }

    /// Turn down the assigned room
    pub async fn decline(&mut self) -> Result<SessionState> {
        if self.state != SessionState::ConfirmPending {
            return Err(Error::invalid_state(format!("Nothing to decline while {}", self.state)));
        }

        Ok(self.quit().await)
    }

    /// Cancel matching from any state
    pub async fn cancel(&mut self) -> SessionState {
        self.quit().await
    }

    /// Stop everything and leave the pool. Safe to call repeatedly.
    pub async fn quit(&mut self) -> SessionState {
        let was = self.state;
        self.reset(SessionState::Idle).await;

        if was != SessionState::Idle {
            info!("[{}] Matching cancelled (was {})", self.id, was);
            self.notify("Matching cancelled");
        }

        self.state
    }

    /// Wait for the next timer firing and apply it.
    ///
    /// Returns the current state right away when no timer is live and nothing
    /// is queued. Not cancel-safe once a firing was received; use
    /// `next_timer_event` in `select!` loops.
    pub async fn process_next(&mut self) -> SessionState {
        if let Some(event) = self.next_timer_event().await {
            self.handle_timer_event(event).await;
        }
        self.state
    }

    /// Wait for the next timer firing. Cancel-safe.
    ///
    /// `None` once no timer can fire anymore and the inbox is drained.
    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        if self.timers_running() {
            self.inbox_rx.recv().await
        } else {
            self.inbox_rx.try_recv().ok()
        }
    }

    /// Apply a timer firing; stale firings are ignored
    pub async fn handle_timer_event(&mut self, event: TimerEvent) {
        if event.generation != self.generation {
            debug!("[{}] Dropping stale {:?}", self.id, event.wakeup);
            return;
        }

        match event.wakeup {
            Wakeup::MatchFound(result) => {
                if self.expect(SessionState::WaitingForMatch, "match") {
                    match result {
                        Ok(room) => self.await_confirmation(room),
                        Err(e) => self.fail(e).await,
                    }
                }
            }
            Wakeup::PeerSignal(result) => {
                if self.expect(SessionState::WaitingForPeer, "completion") {
                    match result {
                        Ok(CompletionSignal::Completed) => self.complete(),
                        Ok(CompletionSignal::Cancelled) => self.rejoin_pool().await,
                        Err(e) => self.fail(e).await,
                    }
                }
            }
            Wakeup::ConfirmWindowClosed => {
                if self.expect(SessionState::ConfirmPending, "confirmation deadline") {
                    info!("[{}] Confirmation window closed", self.id);
                    self.quit().await;
                }
            }
            Wakeup::MatchTimedOut => {
                if self.expect(SessionState::WaitingForMatch, "match timeout") {
                    info!("[{}] No match found in time", self.id);
                    self.notify("No match found");
                    self.quit().await;
                }
            }
        }
    }

    /// Tear down: stop timers and unregister regardless of state
    pub async fn close(mut self) {
        self.stop_timers();
        self.closed = true;
        self.registration_pending = false;
        self.unregister_best_effort().await;
        debug!("[{}] Session closed", self.id);
    }

    fn expect(&self, expected: SessionState, what: &str) -> bool {
        if self.state == expected {
            return true;
        }
        debug!("[{}] Ignoring {} result while {}", self.id, what, self.state);
        false
    }

    fn wait_for_match(&mut self) {
        let generation = self.stop_timers();
        self.room = None;

        let service = self.service.clone();
        let inbox = self.inbox_tx.clone();
        self.poller = Some(Poller::start(
            self.config.match_poll_interval,
            move || {
                let service = service.clone();
                async move {
                    match service.poll_for_match().await.and_then(MatchPoll::into_room) {
                        Ok(Some(room)) => ProbeOutcome::Transition(room),
                        Ok(None) => ProbeOutcome::Continue,
                        Err(e) => ProbeOutcome::Abort(e),
                    }
                }
            },
            move |result| {
                let _ = inbox.send(TimerEvent { generation, wakeup: Wakeup::MatchFound(result) });
            },
        ));

        if let Some(timeout) = self.config.match_timeout {
            let inbox = self.inbox_tx.clone();
            self.deadline = Some(DeadlineTimer::start(timeout, move || {
                let _ = inbox.send(TimerEvent { generation, wakeup: Wakeup::MatchTimedOut });
            }));
        }

        self.set_state(SessionState::WaitingForMatch);
    }

    fn await_confirmation(&mut self, room: MatchedRoom) {
        let generation = self.stop_timers();
        info!("[{}] Matched into room {}", self.id, room.room_id);
        self.room = Some(room);

        let inbox = self.inbox_tx.clone();
        let on_expire = move || {
            let _ = inbox.send(TimerEvent { generation, wakeup: Wakeup::ConfirmWindowClosed });
        };

        self.deadline = Some(match self.config.countdown {
            Some(countdown) => {
                let events = self.events.clone();
                DeadlineTimer::start_with_countdown(
                    self.config.confirm_window,
                    countdown,
                    on_expire,
                    move |progress| {
                        let _ = events.send(SessionEvent::Countdown(progress));
                    },
                )
            }
            None => DeadlineTimer::start(self.config.confirm_window, on_expire),
        });

        self.set_state(SessionState::ConfirmPending);
    }

    async fn wait_for_peer(&mut self) {
        let generation = self.stop_timers();

        let Some(room_id) = self.room_id().map(str::to_owned) else {
            self.fail(Error::invalid_state("Confirmed without a room")).await;
            return;
        };

        let service = self.service.clone();
        let inbox = self.inbox_tx.clone();
        self.poller = Some(Poller::start(
            self.config.completion_poll_interval,
            move || {
                let service = service.clone();
                let room_id = room_id.clone();
                async move {
                    match service.poll_for_completion(&room_id).await {
                        Ok(poll) => match poll.signal() {
                            Some(signal) => ProbeOutcome::Transition(signal),
                            None => ProbeOutcome::Continue,
                        },
                        Err(e) => ProbeOutcome::Abort(e),
                    }
                }
            },
            move |result| {
                let _ = inbox.send(TimerEvent { generation, wakeup: Wakeup::PeerSignal(result) });
            },
        ));

        self.set_state(SessionState::WaitingForPeer);
    }

    async fn rejoin_pool(&mut self) {
        self.stop_timers();
        info!("[{}] Another participant cancelled room {}", self.id, self.room_id().unwrap_or("?"));
        self.notify("Another user cancelled");

        match self.service.cancel_confirm().await {
            Ok(response) if response.is_cancelled => {
                self.last_error = None;
                self.wait_for_match();
            }
            Ok(_) => self.fail(Error::refused("Confirmation could not be withdrawn")).await,
            Err(e) => self.fail(e).await,
        }
    }

    fn complete(&mut self) {
        self.stop_timers();
        self.request = None;
        self.set_state(SessionState::Completed);

        if let Some(room) = &self.room {
            info!("[{}] Room {} ready at {}", self.id, room.room_id, room.room_url);
            let _ = self.events.send(SessionEvent::Navigate { room_url: room.room_url.clone() });
        }
    }

    async fn fail(&mut self, err: Error) {
        warn!("[{}] Failed while {}: {}", self.id, self.state, err);

        let target = if err.is_protocol() { SessionState::Failed } else { SessionState::Idle };
        self.reset(target).await;
        self.notify(format!("Matching failed: {}", err));
        self.last_error = Some(err);
    }

    async fn reset(&mut self, target: SessionState) {
        self.stop_timers();
        self.request = None;
        self.room = None;

        if self.registration_pending {
            self.registration_pending = false;
            self.unregister_best_effort().await;
        }

        self.set_state(target);
    }

    /// A timer task is alive and may still post into the inbox
    fn timers_running(&self) -> bool {
        self.poller.as_ref().is_some_and(Poller::is_running)
            || self.deadline.as_ref().is_some_and(DeadlineTimer::is_running)
    }

    /// Stop both timers and start a new generation
    fn stop_timers(&mut self) -> u64 {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        if let Some(mut deadline) = self.deadline.take() {
            deadline.stop();
        }
        self.generation += 1;
        self.generation
    }

    async fn unregister_best_effort(&self) {
        match self.service.unregister().await {
            Ok(response) => {
                debug!("[{}] Unregistered (is_unregistered={})", self.id, response.is_unregistered)
            }
            Err(e) => warn!("[{}] Unregister failed: {}", self.id, e),
        }
    }

    fn set_state(&mut self, next: SessionState) {
        let from = self.state;
        if from == next {
            return;
        }
        if !from.can_transition_to(next) {
            warn!("[{}] Unexpected transition {} -> {}", self.id, from, next);
        }

        debug!("[{}] {} -> {}", self.id, from, next);
        self.state = next;
        let _ = self.events.send(SessionEvent::StateChanged { from, to: next });
    }

    fn notify(&self, message: impl Into<String>) {
        let _ = self.events.send(SessionEvent::Notice(message.into()));
    }
}

impl Drop for MatchmakingSession {
    fn drop(&mut self) {
        self.stop_timers();
        if self.closed {
            return;
        }

        // Dropped without close(): still leave the pool if a runtime is around
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let service = self.service.clone();
                let id = self.id.clone();
                handle.spawn(async move {
                    if let Err(e) = service.unregister().await {
                        warn!("[{}] Unregister on drop failed: {}", id, e);
                    }
                });
            }
            Err(_) => warn!("[{}] Dropped outside a runtime; unregister skipped", self.id),
        }
    }
}
