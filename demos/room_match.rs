// Room matching example
//
// This example demonstrates:
// - Configuring the HTTP matchmaking service
// - Registering for a topic and waiting for a match
// - Confirming the offered room and following it once everyone accepted
//
// Usage:
//   ROOMMATCH_CSRF=<token> cargo run --example room_match -- http://localhost:8000/chatrooms/ chess 2

use std::env;
use std::sync::Arc;
use log::{error, info, warn};
use roommatch::{
    HttpMatchService, MatchRequest, MatchmakingSession, Result, ServiceConfig, SessionConfig,
    SessionEvent, SessionState, TopicService,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <base_url> <topic> [capacity]", args[0]);
        eprintln!("  {} http://localhost:8000/chatrooms/ chess 2", args[0]);
        std::process::exit(1);
    }

    let base_url = &args[1];
    let topic = &args[2];
    let capacity = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(2);

    let mut builder = ServiceConfig::builder(base_url.as_str());
    if let Ok(token) = env::var("ROOMMATCH_CSRF") {
        builder = builder.csrf_token(token);
    }
    let service = Arc::new(HttpMatchService::new(builder.build()?)?);

    match service.search_topics(topic).await {
        Ok(found) if found.is_empty() => warn!("Topic '{}' is not in the catalogue", topic),
        Ok(found) => info!("Catalogue has {} topic(s) matching '{}'", found.len(), topic),
        Err(e) => warn!("Topic search failed: {}", e),
    }

    let (mut session, mut events) = MatchmakingSession::new(service, SessionConfig::default());
    session.quit().await;

    let state = session.start(MatchRequest::new(topic.as_str(), capacity)?).await?;
    if state != SessionState::WaitingForMatch {
        error!("Registration failed: {:?}", session.last_error());
        session.close().await;
        return Ok(());
    }
    info!("Waiting for a match on '{}' (press Ctrl+C to stop)", topic);

    loop {
        tokio::select! {
            Some(event) = session.next_timer_event() => {
                session.handle_timer_event(event).await;
            }
            Some(event) = events.recv() => match event {
                SessionEvent::StateChanged { to: SessionState::ConfirmPending, .. } => {
                    info!("Matched into room {:?}, confirming", session.room_id());
                    if let Err(e) = session.confirm().await {
                        warn!("Confirmation not sent: {}", e);
                    }
                }
                SessionEvent::StateChanged { from, to } => info!("{} -> {}", from, to),
                SessionEvent::Notice(text) => info!("{}", text),
                SessionEvent::Countdown(_) => {}
                SessionEvent::Navigate { room_url } => {
                    info!("Room ready: {}", room_url);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }

        if matches!(session.state(), SessionState::Idle | SessionState::Failed) {
            warn!("Matching ended: {:?}", session.last_error());
            break;
        }
    }

    session.close().await;
    Ok(())
}
