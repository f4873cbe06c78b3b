//! Host simulation backend.
//!
//! Stands in for the probe, the smart plug, the GPIO pins and the LED
//! panel when the controller runs on a development machine.  The probe
//! and the plug share one [`SimBath`], so switching the heater changes
//! the temperatures the loop reads back.

use core::cell::RefCell;
use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::{debug, trace};

use crate::app::ports::{ConnectionError, PlugDevice, SegmentPanel, SensorError, TemperatureProbe};

/// Room the bath loses heat to.
const AMBIENT_C: f32 = 21.0;
/// Heating rate with the element on.
const HEAT_RATE_C_PER_S: f32 = 0.15;
/// Newtonian loss coefficient.
const LOSS_PER_S: f32 = 0.002;

const PROBE_CONVERSION: Duration = Duration::from_millis(50);
const PLUG_LATENCY: Duration = Duration::from_millis(20);

// ── Bath model ───────────────────────────────────────────────

struct BathState {
    celsius: f32,
    heater_on: bool,
    updated: Instant,
}

impl BathState {
    fn advance(&mut self, now: Instant) {
        let dt = now.duration_since(self.updated).as_secs_f32();
        self.updated = now;
        let gain = if self.heater_on { HEAT_RATE_C_PER_S } else { 0.0 };
        self.celsius += (gain - LOSS_PER_S * (self.celsius - AMBIENT_C)) * dt;
    }
}

/// Shared water bath.  Cheap to clone; the probe thread holds one copy.
#[derive(Clone)]
pub struct SimBath {
    state: Arc<CriticalSectionMutex<RefCell<BathState>>>,
}

impl SimBath {
    pub fn new(start_celsius: f32) -> Self {
        Self {
            state: Arc::new(CriticalSectionMutex::new(RefCell::new(BathState {
                celsius: start_celsius,
                heater_on: false,
                updated: Instant::now(),
            }))),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut BathState) -> R) -> R {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            state.advance(Instant::now());
            f(&mut state)
        })
    }

    pub fn temperature(&self) -> f32 {
        self.with(|s| s.celsius)
    }

    pub fn heater_on(&self) -> bool {
        self.with(|s| s.heater_on)
    }

    fn set_heater(&self, on: bool) {
        self.with(|s| s.heater_on = on);
    }
}

// ── Probe ────────────────────────────────────────────────────

pub struct SimProbe {
    bath: SimBath,
}

impl SimProbe {
    pub fn new(bath: SimBath) -> Self {
        Self { bath }
    }
}

impl TemperatureProbe for SimProbe {
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        std::thread::sleep(PROBE_CONVERSION);
        Ok(self.bath.temperature())
    }
}

// ── Plug ─────────────────────────────────────────────────────

/// Smart plug driving the simulated element.  With `fail_every(n)` each
/// n-th request times out, exercising the reconciler's recovery path.
pub struct SimPlug {
    bath: SimBath,
    fail_every: Option<u32>,
    calls: u32,
}

impl SimPlug {
    pub fn new(bath: SimBath) -> Self {
        Self {
            bath,
            fail_every: None,
            calls: 0,
        }
    }

    pub fn fail_every(mut self, n: u32) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    async fn round_trip(&mut self) -> Result<(), ConnectionError> {
        async_io_mini::Timer::after(PLUG_LATENCY).await;
        self.calls = self.calls.wrapping_add(1);
        match self.fail_every {
            Some(n) if self.calls % n == 0 => Err(ConnectionError::Timeout),
            _ => Ok(()),
        }
    }
}

impl PlugDevice for SimPlug {
    async fn turn_on(&mut self) -> Result<(), ConnectionError> {
        self.round_trip().await?;
        self.bath.set_heater(true);
        Ok(())
    }

    async fn turn_off(&mut self) -> Result<(), ConnectionError> {
        self.round_trip().await?;
        self.bath.set_heater(false);
        Ok(())
    }

    async fn is_on(&mut self) -> Result<bool, ConnectionError> {
        self.round_trip().await?;
        Ok(self.bath.heater_on())
    }
}

// ── GPIO ─────────────────────────────────────────────────────

/// Output pin that only remembers its level.
#[derive(Debug, Default)]
pub struct SimOutputPin {
    gpio: u8,
    high: bool,
}

impl SimOutputPin {
    pub fn new(gpio: u8) -> Self {
        Self { gpio, high: false }
    }
}

impl ErrorType for SimOutputPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimOutputPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        trace!("gpio{}: low", self.gpio);
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        trace!("gpio{}: high", self.gpio);
        self.high = true;
        Ok(())
    }
}

/// Input pin whose level another thread may flip.
#[derive(Debug, Clone)]
pub struct SimInputPin {
    high: Arc<AtomicBool>,
}

impl SimInputPin {
    pub fn new(high: bool) -> Self {
        Self {
            high: Arc::new(AtomicBool::new(high)),
        }
    }

    pub fn set_high(&self, high: bool) {
        self.high.store(high, Ordering::Relaxed);
    }
}

impl ErrorType for SimInputPin {
    type Error = core::convert::Infallible;
}

impl InputPin for SimInputPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high.load(Ordering::Relaxed))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high.load(Ordering::Relaxed))
    }
}

// ── Segment panel ────────────────────────────────────────────

/// Panel that logs what it would show.
#[derive(Debug, Default)]
pub struct LogPanel {
    shown: String,
}

impl LogPanel {
    pub fn shown(&self) -> &str {
        &self.shown
    }
}

impl SegmentPanel for LogPanel {
    type Error = core::convert::Infallible;

    fn write_str(&mut self, digits: &str) -> Result<(), Self::Error> {
        if self.shown != digits {
            debug!("display: [{:>4}]", digits);
            digits.clone_into(&mut self.shown);
        }
        Ok(())
    }

    fn blank(&mut self) -> Result<(), Self::Error> {
        self.write_str("")
    }
}
