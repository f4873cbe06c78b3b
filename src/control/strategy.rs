//! Heater control strategies.
//!
//! A strategy maps `(temperature, observed plug state, now)` to an optional
//! desired plug state.  `None` means "leave the plug alone".  Both variants
//! sit behind the same [`Debounce`] gate, which suppresses any decision
//! for `min_change_interval` after the *observed* plug state changes.
//!
//! ```text
//!   Threshold (target 65, h 2.5)        TwoPhase (target 63, band 5)
//!
//!   ──────── ON ────────┐                ── ON ──┬─ toggle ─┬── OFF ──
//!                       │ dead band              │ ON→OFF   │
//!                       └──── OFF ────           │ OFF→ON   │
//!   ───────────────── 62.5 ──────────▶ °C  ───── 58 ──────── 63 ────▶ °C
//! ```
//!
//! The debounce is independent of the reconciler's own rate limit; both
//! gates apply.

use core::time::Duration;

use log::debug;

use crate::actuator::PhysicalState;
use crate::config::{StrategyKind, SystemConfig};

// ── Debounce ─────────────────────────────────────────────────

/// Time gate keyed on changes of the observed plug state.
#[derive(Debug, Clone)]
pub struct Debounce {
    min_change_interval: Duration,
    last_observed: Option<PhysicalState>,
    last_change: Duration,
}

impl Debounce {
    pub fn new(min_change_interval: Duration) -> Self {
        Self {
            min_change_interval,
            last_observed: None,
            last_change: Duration::ZERO,
        }
    }

    /// Record `observed` and report whether a decision is allowed at `now`.
    /// The first observation counts as a change.
    pub fn admit(&mut self, observed: PhysicalState, now: Duration) -> bool {
        if self.last_observed != Some(observed) {
            debug!(
                "strategy: observed plug {:?} -> {:?}",
                self.last_observed, observed
            );
            self.last_observed = Some(observed);
            self.last_change = now;
        }
        now.saturating_sub(self.last_change) >= self.min_change_interval
    }
}

// ── Threshold ────────────────────────────────────────────────

/// Plain on/off around a single switch point `target − hysteresis`.
#[derive(Debug, Clone)]
pub struct Threshold {
    target: f32,
    hysteresis: f32,
    debounce: Debounce,
}

impl Threshold {
    pub const DEFAULT_HYSTERESIS_C: f32 = 2.5;

    pub fn new(target: f32, hysteresis: f32, min_change_interval: Duration) -> Self {
        Self {
            target,
            hysteresis,
            debounce: Debounce::new(min_change_interval),
        }
    }

    pub fn decide(&mut self, temp: f32, observed: PhysicalState, now: Duration) -> Option<bool> {
        if !self.debounce.admit(observed, now) {
            return None;
        }
        let switch_point = self.target - self.hysteresis;
        if temp < switch_point {
            Some(true)
        } else if temp > switch_point {
            Some(false)
        } else {
            None
        }
    }
}

// ── TwoPhase ─────────────────────────────────────────────────

/// Full power far below target, duty-cycling close to it, off above it.
#[derive(Debug, Clone)]
pub struct TwoPhase {
    target: f32,
    band: f32,
    debounce: Debounce,
}

impl TwoPhase {
    pub const DEFAULT_TARGET_C: f32 = 63.0;
    pub const DEFAULT_BAND_C: f32 = 5.0;

    pub fn new(target: f32, band: f32, min_change_interval: Duration) -> Self {
        Self {
            target,
            band,
            debounce: Debounce::new(min_change_interval),
        }
    }

    pub fn decide(&mut self, temp: f32, observed: PhysicalState, now: Duration) -> Option<bool> {
        if !self.debounce.admit(observed, now) {
            return None;
        }
        if temp < self.target - self.band {
            Some(true)
        } else if temp < self.target {
            // Each phase lasts at least one debounce window.
            observed.as_bool().map(|on| !on)
        } else {
            Some(false)
        }
    }
}

// ── ControlStrategy ──────────────────────────────────────────

/// The strategy chosen at startup.
#[derive(Debug, Clone)]
pub enum ControlStrategy {
    Threshold(Threshold),
    TwoPhase(TwoPhase),
}

impl ControlStrategy {
    pub fn from_config(config: &SystemConfig) -> Self {
        let interval = config.min_change_interval();
        match config.strategy {
            StrategyKind::Threshold => Self::Threshold(Threshold::new(
                config.target_temperature_c,
                config.hysteresis_c,
                interval,
            )),
            StrategyKind::TwoPhase => Self::TwoPhase(TwoPhase::new(
                config.target_temperature_c,
                config.duty_band_c,
                interval,
            )),
        }
    }

    pub fn decide(&mut self, temp: f32, observed: PhysicalState, now: Duration) -> Option<bool> {
        let decision = match self {
            Self::Threshold(s) => s.decide(temp, observed, now),
            Self::TwoPhase(s) => s.decide(temp, observed, now),
        };
        debug!(
            "{}: {:.2}\u{00b0}C (target {:.2}), plug {:?} -> {:?}",
            self.name(),
            temp,
            self.target(),
            observed,
            decision
        );
        decision
    }

    pub fn target(&self) -> f32 {
        match self {
            Self::Threshold(s) => s.target,
            Self::TwoPhase(s) => s.target,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Threshold(_) => "threshold",
            Self::TwoPhase(_) => "two_phase",
        }
    }
}
