//! Reusable UI components shared across views.

pub mod sparkline;
pub mod status_led;

pub use sparkline::Sparkline;
pub use status_led::{StatusLed, StatusLedState};
