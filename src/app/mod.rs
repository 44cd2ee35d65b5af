use crate::api::{ApiCommand, ApiServer};
use crate::config::Config;
use crate::db::Database;
use crate::meeting::{
    Clock, MeetingSession, MeetingSink, MeetingTracker, PostMeetingHook, ShellCommandHook,
    SqliteMeetingSink, SystemClock, TickEvent, TrackerStatusHandle,
};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

const COMMAND_BUFFER: usize = 10;
const TICK_BUFFER: usize = 64;

pub async fn run_service() -> Result<()> {
    info!("Starting meetcost service");

    let config = Config::load()?;
    let db = Database::default_location()?;
    // Fail early on an unusable database rather than at the first stop
    db.connect()?;
    info!("Recording meetings to {:?}", db.path());

    let status_handle = TrackerStatusHandle::default();
    let sink: Box<dyn MeetingSink> = Box::new(SqliteMeetingSink::new(db.clone()));
    let (session, tick_rx) = build_session(
        &config,
        Arc::new(SystemClock),
        status_handle.clone(),
        Some(sink),
        build_hook(&config),
    );
    status_handle.publish(session.snapshot()).await;

    let (tx, rx) = mpsc::channel::<ApiCommand>(COMMAND_BUFFER);
    let api_server = ApiServer::new(tx, status_handle, db, &config);
    tokio::spawn(async move {
        if let Err(e) = api_server.start().await {
            error!("API server failed: {}", e);
        }
    });

    info!("meetcost is ready!");
    info!(
        "Try it: curl -X POST {}/tracker/start",
        config.server.base_url()
    );

    run_session_loop(session, rx, tick_rx).await;
    Ok(())
}

/// Build a session from config. Returns the session and the receiving end of
/// its tick channel.
pub fn build_session(
    config: &Config,
    clock: Arc<dyn Clock>,
    status: TrackerStatusHandle,
    sink: Option<Box<dyn MeetingSink>>,
    hook: Option<Arc<dyn PostMeetingHook>>,
) -> (MeetingSession, mpsc::Receiver<TickEvent>) {
    let tracker = MeetingTracker::new(
        config.tracker.initial_meeting(),
        config.rates.clone(),
        clock,
    )
    .with_history_capacity(config.tracker.history_capacity);

    let (tick_tx, tick_rx) = mpsc::channel(TICK_BUFFER);
    let session = MeetingSession::new(
        tracker,
        config.tracker.tick_interval(),
        tick_tx,
        status,
        sink,
        hook,
    );
    (session, tick_rx)
}

fn build_hook(config: &Config) -> Option<Arc<dyn PostMeetingHook>> {
    let command = config.meeting.post_command.trim();
    if command.is_empty() {
        return None;
    }
    info!("Post-meeting hook configured: {}", command);
    Some(Arc::new(ShellCommandHook::new(
        command.to_string(),
        config.meeting.post_command_timeout_seconds,
    )))
}

/// Serve commands and ticks until every command sender is dropped.
///
/// Commands and ticks are handled one at a time, so an edit never races a
/// tick.
pub async fn run_session_loop(
    mut session: MeetingSession,
    mut rx: mpsc::Receiver<ApiCommand>,
    mut tick_rx: mpsc::Receiver<TickEvent>,
) {
    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(command) => handle_command(&mut session, command).await,
                None => {
                    info!("Command channel closed, stopping session loop");
                    break;
                }
            },
            Some(event) = tick_rx.recv() => session.on_tick(event).await,
        }
    }
}

/// Spawn the session loop on the runtime.
pub fn spawn_session_loop(
    session: MeetingSession,
    rx: mpsc::Receiver<ApiCommand>,
    tick_rx: mpsc::Receiver<TickEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run_session_loop(session, rx, tick_rx))
}

pub async fn handle_command(session: &mut MeetingSession, command: ApiCommand) {
    // A dropped reply means the HTTP caller went away; the command still ran.
    match command {
        ApiCommand::Start(reply) => {
            let result = session.start().await;
            match &result {
                Ok(snapshot) => info!("Meeting '{}' running", snapshot.config.title),
                Err(e) => info!("Start rejected: {}", e),
            }
            let _ = reply.send(result);
        }
        ApiCommand::Pause(reply) => {
            let snapshot = session.pause().await;
            info!("Meeting paused at {:.0}s", snapshot.elapsed_seconds);
            let _ = reply.send(snapshot);
        }
        ApiCommand::Stop(reply) => {
            let result = session.stop().await;
            info!(
                "Meeting '{}' stopped: {:.2} over {:.0}s",
                result.summary.title, result.summary.total_cost, result.summary.elapsed_seconds
            );
            let _ = reply.send(result);
        }
        ApiCommand::UpdateConfig(update, reply) => {
            let field = update.field_name();
            let result = session.update_config(update).await;
            if let Err(e) = &result {
                info!("Config update for '{}' rejected: {}", field, e);
            }
            let _ = reply.send(result);
        }
        ApiCommand::Preview(update, reply) => {
            debug!("Previewing config update for '{}'", update.field_name());
            let _ = reply.send(session.preview(update));
        }
        ApiCommand::LoadConfig(meeting, reply) => {
            let _ = reply.send(session.load_config(meeting).await);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostMethod;
    use crate::meeting::{ConfigUpdate, ManualClock, TrackerPhase};
    use tokio::sync::oneshot;

    fn setup() -> (MeetingSession, ManualClock, mpsc::Receiver<TickEvent>) {
        let clock = ManualClock::default();
        let mut config = Config::default();
        config.tracker.default_participants = 4;
        let (session, tick_rx) = build_session(
            &config,
            Arc::new(clock.clone()),
            TrackerStatusHandle::default(),
            None,
            None,
        );
        (session, clock, tick_rx)
    }

    #[test]
    fn test_build_hook_skips_empty_command() {
        let mut config = Config::default();
        assert!(build_hook(&config).is_none());
        config.meeting.post_command = "   ".to_string();
        assert!(build_hook(&config).is_none());
        config.meeting.post_command = "echo done".to_string();
        assert!(build_hook(&config).is_some());
    }

    #[tokio::test]
    async fn test_build_session_uses_tracker_defaults() {
        let (session, _clock, _ticks) = setup();
        let cfg = session.tracker().config();
        assert_eq!(cfg.participants, 4);
        assert_eq!(cfg.cost_method, CostMethod::FixedRate);
    }

    #[tokio::test]
    async fn test_handle_command_round_trip() {
        let (mut session, clock, _ticks) = setup();

        let (tx, rx) = oneshot::channel();
        handle_command(&mut session, ApiCommand::Start(tx)).await;
        assert_eq!(rx.await.unwrap().unwrap().state, TrackerPhase::Running);

        clock.advance_secs(1800);
        let (tx, rx) = oneshot::channel();
        handle_command(
            &mut session,
            ApiCommand::UpdateConfig(ConfigUpdate::Participants(2), tx),
        )
        .await;
        let snapshot = rx.await.unwrap().unwrap();
        assert_eq!(snapshot.config.participants, 2);

        let (tx, rx) = oneshot::channel();
        handle_command(&mut session, ApiCommand::Stop(tx)).await;
        let result = rx.await.unwrap();
        assert!((result.summary.total_cost - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_loop_exits_when_senders_dropped() {
        let (session, _clock, tick_rx) = setup();
        let (tx, rx) = mpsc::channel(1);
        let handle = spawn_session_loop(session, rx, tick_rx);
        drop(tx);
        handle.await.unwrap();
    }
}
