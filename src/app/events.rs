//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, feed a dashboard,
//! record them in a test.

use crate::actuator::PhysicalState;
use crate::config::Mode;
use crate::error::SensorError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has started.
    Started {
        mode: Mode,
        strategy: &'static str,
        target: f32,
    },

    /// The front-panel switch changed position.
    SwitchChanged { on: bool },

    /// One active-tick sample, as written to the telemetry log.
    Sample(SampleData),

    /// The strategy asked for a plug state and it was forwarded.
    HeaterRequested { on: bool, temperature: f32 },

    /// An active tick failed; the heater has been forced off.
    FailSafe(SensorError),

    /// Shutdown finished.
    Stopped,
}

/// A point-in-time sample suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleData {
    pub temperature: f32,
    pub plug: PhysicalState,
    pub target: f32,
}
