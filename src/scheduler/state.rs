//! Scheduler load state and display memory

use crate::scheduler::render::RenderRequest;
use crate::storage::{Quote, StoreHandle};

/// Where the scheduler is in getting hold of the store
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    /// No handle, nothing requested yet
    #[default]
    Uninitialized,

    /// Open in flight, waiting for a `WidgetEvent::Opened` from the current load
    Loading,

    /// Handle available
    Ready(StoreHandle),
}

impl LoadState {
    pub fn name(&self) -> &'static str {
        match self {
            LoadState::Uninitialized => "uninitialized",
            LoadState::Loading => "loading",
            LoadState::Ready(_) => "ready",
        }
    }
}

/// What is on screen.
///
/// `last_shown` only goes from `None` to `Some`, and after that is only
/// replaced by another successful lookup.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub last_shown: Option<Quote>,
    pub last_render: Option<RenderRequest>,
}
