//! TUI screens

mod clock;

pub use clock::{quote_lines, ClockScreen};
