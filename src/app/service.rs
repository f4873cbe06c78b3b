//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns the strategy, the telemetry log and the plug
//! handle.  Every peripheral it touches arrives through the port traits
//! bundled in [`Peripherals`], so the whole loop runs against mocks in
//! the integration tests.
//!
//! ```text
//!  TemperatureSource ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                        │       ControlLoop         │
//!  Display/Indicator ◀── │  strategy · telemetry     │ ──▶ PlugHandle
//!                        └──────────────────────────┘
//! ```

use core::time::Duration;

use log::{error, info, warn};

use crate::actuator::PhysicalState;
use crate::actuator::reconciler::PlugHandle;
use crate::config::{Mode, SystemConfig};
use crate::control::ControlStrategy;
use crate::drivers::display::ERROR_GLYPH;
use crate::telemetry::TelemetryLogger;

use super::events::{AppEvent, SampleData};
use super::ports::{DisplayPort, EventSink, IndicatorMode, IndicatorPort, SensorError, TemperatureSource};

/// Front-panel and probe ports the loop drives each tick.
pub struct Peripherals<Sw, T, D, I> {
    pub switch: Sw,
    pub thermometer: T,
    pub display: D,
    pub indicator: I,
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

pub struct ControlLoop {
    mode: Mode,
    active: bool,
    strategy: ControlStrategy,
    plug: PlugHandle,
    telemetry: TelemetryLogger,
    /// Last desired state forwarded to the plug; drives the indicator.
    last_desired: Option<bool>,
}

impl ControlLoop {
    pub fn new(config: &SystemConfig, plug: PlugHandle, telemetry: TelemetryLogger) -> Self {
        Self {
            mode: config.mode,
            active: false,
            strategy: ControlStrategy::from_config(config),
            plug,
            telemetry,
            last_desired: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        info!(
            "control loop started: mode={:?}, strategy={}, target={:.1}",
            self.mode,
            self.strategy.name(),
            self.strategy.target()
        );
        sink.emit(&AppEvent::Started {
            mode: self.mode,
            strategy: self.strategy.name(),
            target: self.strategy.target(),
        });
    }

    /// Front-panel switch edge.  The first observation always counts as one.
    pub fn on_switch_changed<Sw, T, D: DisplayPort, I>(
        &mut self,
        on: bool,
        hw: &mut Peripherals<Sw, T, D, I>,
        sink: &mut impl EventSink,
    ) {
        self.active = on;
        sink.emit(&AppEvent::SwitchChanged { on });

        match self.mode {
            Mode::SwitchDetect => {
                info!("switch detect: switch is {}", if on { "ON" } else { "OFF" });
            }
            Mode::Normal if on => info!("switch ON: regulating bath"),
            Mode::Normal => {
                info!("switch OFF: heater off");
                self.plug.request_off();
                self.last_desired = Some(false);
                hw.display.clear();
            }
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One control period.  Never returns an error: a failed active tick
    /// shows the error glyph and forces the heater off.
    pub async fn tick<Sw, T, D, I>(
        &mut self,
        hw: &mut Peripherals<Sw, T, D, I>,
        now: Duration,
        sink: &mut impl EventSink,
    ) where
        T: TemperatureSource,
        D: DisplayPort,
        I: IndicatorPort,
    {
        if !self.active {
            self.plug.request_off();
            self.last_desired = Some(false);
            hw.display.clear();
            hw.indicator.set_mode(IndicatorMode::Off).await;
            return;
        }

        if let Err(e) = self.regulate(hw, now, sink).await {
            error!("control tick failed: {}", e);
            hw.display.show_text(ERROR_GLYPH);
            self.plug.request_off();
            self.last_desired = Some(false);
            sink.emit(&AppEvent::FailSafe(e));
        }

        let mode = if self.last_desired == Some(true) {
            IndicatorMode::Solid
        } else {
            IndicatorMode::Blinking
        };
        hw.indicator.set_mode(mode).await;
    }

    async fn regulate<Sw, T, D, I>(
        &mut self,
        hw: &mut Peripherals<Sw, T, D, I>,
        now: Duration,
        sink: &mut impl EventSink,
    ) -> Result<(), SensorError>
    where
        T: TemperatureSource,
        D: DisplayPort,
    {
        let temperature = hw.thermometer.read_temperature().await?;
        hw.display.show_temperature(temperature);

        let observed = self.plug.query();
        if observed == PhysicalState::Unknown {
            warn!("plug state unknown; logging heater as OFF");
        }
        self.telemetry.log(temperature, observed == PhysicalState::On);
        sink.emit(&AppEvent::Sample(SampleData {
            temperature,
            plug: observed,
            target: self.strategy.target(),
        }));

        if let Some(on) = self.strategy.decide(temperature, observed, now) {
            if on {
                self.plug.request_on();
            } else {
                self.plug.request_off();
            }
            self.last_desired = Some(on);
            sink.emit(&AppEvent::HeaterRequested { on, temperature });
        }
        Ok(())
    }

    /// Blank the panel, request OFF and flush telemetry.  Waiting for the
    /// plug to confirm is left to the caller, which owns the timers.
    pub async fn shutdown<Sw, T, D, I>(
        &mut self,
        hw: &mut Peripherals<Sw, T, D, I>,
        sink: &mut impl EventSink,
    ) where
        D: DisplayPort,
        I: IndicatorPort,
    {
        hw.display.clear();
        hw.indicator.set_mode(IndicatorMode::Off).await;
        self.plug.request_off();
        self.active = false;
        self.last_desired = None;
        self.telemetry.flush();
        sink.emit(&AppEvent::Stopped);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn last_desired(&self) -> Option<bool> {
        self.last_desired
    }

    pub fn target(&self) -> f32 {
        self.strategy.target()
    }

    pub fn plug(&self) -> &PlugHandle {
        &self.plug
    }

    pub fn telemetry(&self) -> &TelemetryLogger {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut TelemetryLogger {
        &mut self.telemetry
    }
}
