//! Daemon process: one scheduler, served over the IPC socket

use anyhow::Result;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::clock::SystemClock;
use crate::config::Settings;
use crate::daemon::ipc::{DaemonRequest, DaemonResponse};
use crate::daemon::server::{IpcServer, RequestHandler};
use crate::scheduler::{self, QuoteScheduler, SchedulerConfig, SharedView, WidgetEvent};
use crate::storage::DataSource;

/// Answers IPC requests from the scheduler's shared view
pub struct DaemonControl {
    view: SharedView,
    events: UnboundedSender<WidgetEvent>,
}

impl DaemonControl {
    pub fn new(view: SharedView, events: UnboundedSender<WidgetEvent>) -> Self {
        Self { view, events }
    }

    /// Queue a reveal and answer with the display it will produce
    fn reveal(&self) -> DaemonResponse {
        if self.events.send(WidgetEvent::Reveal).is_err() {
            return DaemonResponse::Error {
                message: "Scheduler is not running".to_string(),
            };
        }

        DaemonResponse::Display(self.view.latest().map(|current| current.revealed()))
    }
}

impl RequestHandler for DaemonControl {
    fn handle(&self, request: DaemonRequest) -> DaemonResponse {
        match request {
            DaemonRequest::Ping => DaemonResponse::Pong,
            DaemonRequest::GetDisplay => DaemonResponse::Display(self.view.latest()),
            DaemonRequest::Reveal => self.reveal(),
            DaemonRequest::Shutdown => DaemonResponse::Ok,
        }
    }
}

/// Run the daemon until asked to stop over IPC or by a signal
pub async fn run(settings: &Settings) -> Result<()> {
    info!("Starting proseclock daemon");

    settings.ensure_dirs()?;
    let server = IpcServer::bind(settings.socket_path())?;

    let pid_path = settings.pid_path();
    std::fs::write(&pid_path, std::process::id().to_string())?;

    let view = SharedView::default();
    let (event_tx, event_rx) = scheduler::event_channel();
    let scheduler = QuoteScheduler::new(
        Arc::new(DataSource::from_settings(settings)),
        view.clone(),
        SystemClock,
        SchedulerConfig::from_settings(settings),
        event_tx.clone(),
    );
    let _ = event_tx.send(WidgetEvent::Enabled);
    let _ = event_tx.send(WidgetEvent::Visible);
    let scheduler_task = tokio::spawn(scheduler::run(scheduler, event_rx));

    let control = Arc::new(DaemonControl::new(view, event_tx.clone()));

    // either branch drops the server, which removes the socket
    tokio::select! {
        _ = server.serve(control) => {}
        _ = shutdown_signal() => info!("Received shutdown signal"),
    }

    info!("Shutting down daemon");

    let _ = event_tx.send(WidgetEvent::Disabled);
    if let Err(e) = scheduler_task.await {
        warn!("Scheduler task ended abnormally: {}", e);
    }

    let _ = std::fs::remove_file(&pid_path);
    Ok(())
}

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{OriginVisibility, RenderRequest, RenderSink, Tone};
    use crate::storage::Quote;

    fn showing_ten() -> SharedView {
        let view = SharedView::default();
        let quote = Quote {
            id: 1,
            minute: 600,
            text: "ten".to_string(),
            author: "Author".to_string(),
            book: "Book".to_string(),
        };
        view.clone()
            .render(&RenderRequest::for_quote(&quote, Tone::Fresh, "{book}"));
        view
    }

    #[test]
    fn reveal_answers_with_origin_visible() {
        let (events, mut rx) = scheduler::event_channel();
        let control = DaemonControl::new(showing_ten(), events);

        match control.handle(DaemonRequest::Reveal) {
            DaemonResponse::Display(Some(shown)) => {
                assert_eq!(shown.origin_visibility, OriginVisibility::Visible);
                assert_eq!(shown.tone, Tone::Fresh);
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert!(matches!(rx.try_recv(), Ok(WidgetEvent::Reveal)));
    }

    #[test]
    fn reveal_without_scheduler_is_an_error() {
        let (events, rx) = scheduler::event_channel();
        drop(rx);
        let control = DaemonControl::new(showing_ten(), events);

        assert!(matches!(
            control.handle(DaemonRequest::Reveal),
            DaemonResponse::Error { .. }
        ));
    }

    #[test]
    fn display_is_read_without_touching_the_scheduler() {
        let (events, mut rx) = scheduler::event_channel();
        let control = DaemonControl::new(showing_ten(), events);

        match control.handle(DaemonRequest::GetDisplay) {
            DaemonResponse::Display(Some(shown)) => {
                assert_eq!(shown.origin_visibility, OriginVisibility::Hidden)
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(control.handle(DaemonRequest::Ping), DaemonResponse::Pong);
        assert!(rx.try_recv().is_err());
    }
}
