//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (probe, plug, display, indicator, switch, event sinks,
//! config storage) implement these traits.  The
//! [`ControlLoop`](super::service::ControlLoop) consumes them via generics,
//! so the domain core never touches hardware or the network directly.
//!
//! The async ports are used only through generics on a single-threaded
//! executor, so their futures carry no `Send` bound.

#![allow(async_fn_in_trait)]

use core::time::Duration;

use crate::config::SystemConfig;
pub use crate::error::{ConfigError, ConnectionError, SensorError};

// ───────────────────────────────────────────────────────────────
// Temperature ports (driven adapter: probe → domain)
// ───────────────────────────────────────────────────────────────

/// Raw blocking probe read (e.g. a DS18B20 sysfs file).  May block for
/// most of a second, so it is only ever called from the probe worker
/// thread, never from the executor.
pub trait TemperatureProbe: Send + 'static {
    fn read_celsius(&mut self) -> Result<f32, SensorError>;
}

/// Read-side port the control loop samples once per active tick.
pub trait TemperatureSource {
    /// Take a fresh reading without stalling the executor.
    async fn read_temperature(&self) -> Result<f32, SensorError>;

    /// Most recent successful reading, if any.
    fn last_temperature(&self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Plug port (driven adapter: domain → smart outlet)
// ───────────────────────────────────────────────────────────────

/// Network-attached switchable outlet.  Every call may fail transiently;
/// the reconciler owns retrying, callers never talk to a device directly.
pub trait PlugDevice {
    async fn turn_on(&mut self) -> Result<(), ConnectionError>;
    async fn turn_off(&mut self) -> Result<(), ConnectionError>;
    async fn is_on(&mut self) -> Result<bool, ConnectionError>;
}

// ───────────────────────────────────────────────────────────────
// Panel ports (driven adapters: domain → front panel)
// ───────────────────────────────────────────────────────────────

/// What the heating indicator should be doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorMode {
    Off,
    /// Heater commanded on.
    Solid,
    /// Active but heater commanded off.
    Blinking,
}

/// Heating indicator.  Switching away from [`IndicatorMode::Blinking`]
/// completes only after the blink task has stopped.
pub trait IndicatorPort {
    async fn set_mode(&mut self, mode: IndicatorMode);
}

/// Four-character numeric display as seen by the domain.  Infallible:
/// adapters log panel faults instead of returning them.
pub trait DisplayPort {
    fn show_temperature(&mut self, celsius: f32);
    fn show_text(&mut self, text: &str);
    fn clear(&mut self);
}

/// Raw segment panel underneath [`DisplayPort`].
pub trait SegmentPanel {
    type Error: core::fmt::Debug;

    /// Render `digits` (at most four characters, may contain one `.`).
    fn write_str(&mut self, digits: &str) -> Result<(), Self::Error>;

    /// Blank every segment.
    fn blank(&mut self) -> Result<(), Self::Error>;
}

/// Front-panel rocker switch.
pub trait SwitchPort {
    fn is_on(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.  Every timing decision in the domain (debounce,
/// rate limiting) is made against this, never against the wall clock.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads system configuration.
///
/// Implementations MUST call [`SystemConfig::validate`] before returning.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}
