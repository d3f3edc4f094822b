//! Minute-aligned refresh timer

use chrono::Local;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use crate::clock::until_next_minute;
use crate::scheduler::WidgetEvent;

/// Fire slightly after the boundary so the clock already reads the new minute
const BOUNDARY_SLACK: Duration = Duration::from_millis(50);

/// Sends `WidgetEvent::Tick` on every minute boundary once armed
#[derive(Debug, Default)]
pub struct MinuteTimer {
    task: Option<JoinHandle<()>>,
}

impl MinuteTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking into `events`. Does nothing if already armed.
    pub fn arm(&mut self, events: UnboundedSender<WidgetEvent>, interval: Duration) {
        if self.is_armed() {
            debug!("Timer already armed");
            return;
        }

        let first = until_next_minute(Local::now()) + BOUNDARY_SLACK;
        debug!("Arming timer, first tick in {:?}, then every {:?}", first, interval);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + first, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if events.send(WidgetEvent::Tick).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Timer disarmed");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for MinuteTimer {
    fn drop(&mut self) {
        self.disarm();
    }
}
