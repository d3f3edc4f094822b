//! Quote scheduler
//!
//! Owns what is on display and decides what to show next. Every input
//! (timer ticks, reveal requests, lifecycle changes, and the completion of
//! the background store open) arrives as a `WidgetEvent` on one channel and
//! is handled in order by `QuoteScheduler::dispatch`.

pub mod render;
pub mod state;
pub mod timer;

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::clock::{format_minute, Clock};
use crate::config::Settings;
use crate::storage::{DataSource, Quote, StoreHandle};

pub use render::{OriginVisibility, RenderRequest, RenderSink, SharedView, TextSink, Tone};
pub use state::{DisplayState, LoadState};
pub use timer::MinuteTimer;

/// Inputs to the scheduler
#[derive(Debug)]
pub enum WidgetEvent {
    /// First instance added: make sure the store exists
    Enabled,
    /// Display became visible and wants content
    Visible,
    /// Refresh timer fired
    Tick,
    /// User asked to see where the quote is from
    Reveal,
    /// Background open finished; `load` names the load that started it
    Opened {
        load: u64,
        result: crate::Result<StoreHandle>,
    },
    /// Last instance removed: stop the timer and release the store
    Disabled,
}

/// Create the channel a scheduler and its helpers talk over
pub fn event_channel() -> (UnboundedSender<WidgetEvent>, UnboundedReceiver<WidgetEvent>) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Minutes searched, counting the current one, when showing the first quote
    pub fallback_attempts: u32,
    pub tick_interval: Duration,
    pub origin_format: String,
}

impl SchedulerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            fallback_attempts: settings.schedule.fallback_attempts,
            tick_interval: settings.schedule.tick_interval(),
            origin_format: settings.display.origin_format.clone(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

pub struct QuoteScheduler<S: RenderSink, C: Clock> {
    source: Arc<DataSource>,
    sink: S,
    clock: C,
    config: SchedulerConfig,
    state: LoadState,
    display: DisplayState,
    timer: MinuteTimer,
    events: UnboundedSender<WidgetEvent>,
    /// Bumped by every load and every shutdown
    load: u64,
}

impl<S: RenderSink, C: Clock> QuoteScheduler<S, C> {
    /// `events` must be the sending half of the channel this scheduler is driven from
    pub fn new(
        source: Arc<DataSource>,
        sink: S,
        clock: C,
        config: SchedulerConfig,
        events: UnboundedSender<WidgetEvent>,
    ) -> Self {
        Self {
            source,
            sink,
            clock,
            config,
            state: LoadState::Uninitialized,
            display: DisplayState::default(),
            timer: MinuteTimer::new(),
            events,
            load: 0,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn last_shown(&self) -> Option<&Quote> {
        self.display.last_shown.as_ref()
    }

    pub fn last_render(&self) -> Option<&RenderRequest> {
        self.display.last_render.as_ref()
    }

    pub fn timer_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Number of the most recent load; open results carrying any other are dropped
    pub fn current_load(&self) -> u64 {
        self.load
    }

    /// Handle one event. Breaks once the scheduler has been disabled.
    pub fn dispatch(&mut self, event: WidgetEvent) -> ControlFlow<()> {
        match event {
            WidgetEvent::Enabled => self.bootstrap(),
            WidgetEvent::Visible | WidgetEvent::Tick => {
                let now = self.clock.minute_of_day();
                self.request_display(now);
            }
            WidgetEvent::Reveal => self.reveal(),
            WidgetEvent::Opened { load, result } => self.on_open_result(load, result),
            WidgetEvent::Disabled => {
                self.shutdown();
                return ControlFlow::Break(());
            }
        }

        ControlFlow::Continue(())
    }

    /// Copy the seed into place if needed, off the async workers.
    /// Failure only means lookups will miss.
    pub fn bootstrap(&self) {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || match source.bootstrap() {
            Ok(outcome) => debug!("Bootstrap: {:?}", outcome),
            Err(e) => error!("Creating quote store failed: {}", e),
        });
    }

    /// Show the quote for `now_minute`, or keep showing the last one dimmed
    pub fn request_display(&mut self, now_minute: i32) {
        let handle = match &self.state {
            LoadState::Uninitialized => {
                self.begin_load();
                return;
            }
            LoadState::Loading => {
                debug!("Store still loading, skipping display for {}", format_minute(now_minute));
                return;
            }
            LoadState::Ready(handle) => handle.clone(),
        };

        if let Some(quote) = self.source.lookup(&handle, now_minute) {
            self.show(quote, Tone::Fresh);
            return;
        }

        debug!("No quote for minute {}", now_minute);
        match self.display.last_shown.clone() {
            Some(previous) => self.render(&previous, Tone::Stale),
            None => {
                info!("Nothing shown yet, reloading quote store");
                self.begin_load();
            }
        }
    }

    fn on_open_result(&mut self, load: u64, result: crate::Result<StoreHandle>) {
        if load != self.load {
            debug!("Dropping open result of load {} (current {})", load, self.load);
            if let Ok(handle) = result {
                // a newer load may own whatever is cached now
                if matches!(self.state, LoadState::Uninitialized) && self.source.holds(&handle) {
                    self.source.close();
                }
            }
            return;
        }

        match result {
            Ok(handle) => self.on_opened(handle),
            // stays Loading; nothing retries until the scheduler is restarted
            Err(e) => error!("Opening quote store failed: {}", e),
        }
    }

    /// Store is open: show something right away and start the timer
    pub fn on_opened(&mut self, handle: StoreHandle) {
        if !matches!(self.state, LoadState::Loading) {
            debug!("Ignoring store open while {}", self.state.name());
            if matches!(self.state, LoadState::Uninitialized) && self.source.holds(&handle) {
                self.source.close();
            }
            return;
        }

        self.state = LoadState::Ready(handle);
        self.first_display();
        self.timer.arm(self.events.clone(), self.config.tick_interval);
    }

    /// Search backwards from the current minute until something is found.
    ///
    /// Returns whether a quote was shown.
    pub fn first_display(&mut self) -> bool {
        let LoadState::Ready(handle) = &self.state else {
            return false;
        };
        let handle = handle.clone();
        let now = self.clock.minute_of_day();

        let attempts = i32::try_from(self.config.fallback_attempts).unwrap_or(i32::MAX);
        let found = (0..attempts)
            .map(|offset| now - offset)
            .find_map(|minute| self.source.lookup(&handle, minute));

        match found {
            Some(quote) => {
                let tone = if quote.minute == now {
                    Tone::Fresh
                } else {
                    Tone::Stale
                };
                self.show(quote, tone);
                true
            }
            None => {
                warn!(
                    "Couldn't find a quote to show within {} minutes of {}",
                    self.config.fallback_attempts,
                    format_minute(now)
                );
                false
            }
        }
    }

    /// Show the origin of whatever is on display
    pub fn reveal(&mut self) {
        let Some(current) = &self.display.last_render else {
            debug!("Reveal with nothing on display");
            return;
        };

        let revealed = current.revealed();
        self.sink.render(&revealed);
        self.display.last_render = Some(revealed);
    }

    /// Stop ticking and release the store
    pub fn shutdown(&mut self) {
        self.timer.disarm();
        self.source.close();
        self.state = LoadState::Uninitialized;
        self.load += 1;
        info!("Scheduler disabled");
    }

    fn begin_load(&mut self) {
        self.state = LoadState::Loading;
        self.load += 1;

        let load = self.load;
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = source.bootstrap() {
                warn!("Bootstrap before open failed: {}", e);
            }
            let _ = events.send(WidgetEvent::Opened {
                load,
                result: source.open(),
            });
        });
    }

    fn show(&mut self, quote: Quote, tone: Tone) {
        self.render(&quote, tone);
        self.display.last_shown = Some(quote);
    }

    fn render(&mut self, quote: &Quote, tone: Tone) {
        let request = RenderRequest::for_quote(quote, tone, &self.config.origin_format);
        debug!("Rendering quote {} ({:?})", quote.id, tone);
        self.sink.render(&request);
        self.display.last_render = Some(request);
    }
}

/// Drive a scheduler from its event channel until it is disabled
pub async fn run<S: RenderSink, C: Clock>(
    mut scheduler: QuoteScheduler<S, C>,
    mut events: UnboundedReceiver<WidgetEvent>,
) {
    while let Some(event) = events.recv().await {
        if scheduler.dispatch(event).is_break() {
            break;
        }
    }
}
