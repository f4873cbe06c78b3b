//! System configuration parameters
//!
//! All tunable parameters for the sous-vide controller.
//! Values are loaded once at startup from `config.yaml` (see
//! [`YamlConfigAdapter`](crate::adapters::config_file::YamlConfigAdapter));
//! every field is optional and falls back to the defaults below.

use core::time::Duration;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::control::{Threshold, TwoPhase};
use crate::error::ConfigError;
use crate::pins;

/// Upper bound for the interval fields given in (fractional) seconds.
const MAX_INTERVAL_SECS: f32 = 86_400.0;

/// Operating mode of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Full temperature control.
    #[default]
    Normal,
    /// Bring-up aid: switch edges are only logged, the plug is left alone.
    SwitchDetect,
}

/// Which control strategy drives the heater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    TwoPhase,
    Threshold,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub mode: Mode,

    // --- Timing ---
    /// Control period while the switch is ON (seconds)
    pub polling_interval_secs: f32,
    /// Control period while the switch is OFF (milliseconds)
    pub idle_polling_interval_ms: u32,
    /// Lower bound on the sleep between ticks (milliseconds)
    pub min_tick_sleep_ms: u32,

    // --- Control ---
    pub target_temperature_c: f32,
    pub strategy: StrategyKind,
    /// Threshold strategy: switch point sits this far below target
    pub hysteresis_c: f32,
    /// Two-phase strategy: width of the duty-cycle zone below target
    pub duty_band_c: f32,
    /// Strategy debounce after an observed plug change (seconds)
    pub min_change_interval_secs: f32,

    pub plug: PlugConfig,
    pub telemetry: TelemetryConfig,
    pub pins: PinConfig,

    // --- Indicator ---
    /// Half period of the "not heating" blink (milliseconds)
    pub blink_interval_ms: u32,

    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
}

/// Smart-plug reconciliation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlugConfig {
    /// Minimum spacing between two executed plug commands (milliseconds)
    pub min_op_interval_ms: u32,
    /// Period of the background reconciliation cycle (milliseconds)
    pub update_interval_ms: u32,
    /// How long shutdown waits for the plug to confirm OFF (milliseconds)
    pub shutdown_settle_ms: u32,
}

/// Telemetry file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub path: PathBuf,
    /// Records buffered before an automatic flush
    pub buffer_size: usize,
    /// Size above which the file is rotated at the next explicit flush
    pub max_bytes: u64,
    /// Number of numbered backups kept (`.1` .. `.K`)
    pub backup_count: u32,
}

/// GPIO assignments, defaulting to [`crate::pins`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub switch_input: u8,
    pub power_led: u8,
    pub display_clk: u8,
    pub display_dio: u8,
    pub one_wire: u8,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,

            // Timing
            polling_interval_secs: 1.0,
            idle_polling_interval_ms: 200,
            min_tick_sleep_ms: 100,

            // Control
            target_temperature_c: TwoPhase::DEFAULT_TARGET_C,
            strategy: StrategyKind::TwoPhase,
            hysteresis_c: Threshold::DEFAULT_HYSTERESIS_C,
            duty_band_c: TwoPhase::DEFAULT_BAND_C,
            min_change_interval_secs: 10.0,

            plug: PlugConfig::default(),
            telemetry: TelemetryConfig::default(),
            pins: PinConfig::default(),

            blink_interval_ms: 250, // 2 Hz blink
            log_level: "info".into(),
        }
    }
}

impl Default for PlugConfig {
    fn default() -> Self {
        Self {
            min_op_interval_ms: 1000,
            update_interval_ms: 1000,
            shutdown_settle_ms: 5000,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/heating_log.tsv"),
            buffer_size: 30,
            max_bytes: 5 * 1024 * 1024, // 5 MiB
            backup_count: 5,
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            switch_input: pins::SWITCH_INPUT_GPIO,
            power_led: pins::POWER_LED_GPIO,
            display_clk: pins::DISPLAY_CLK_GPIO,
            display_dio: pins::DISPLAY_DIO_GPIO,
            one_wire: pins::ONE_WIRE_GPIO,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.polling_interval_secs > 0.0 && self.polling_interval_secs <= MAX_INTERVAL_SECS) {
            return Err(ConfigError::ValidationFailed(
                "polling_interval_secs must be in (0, 86400]",
            ));
        }
        if self.idle_polling_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "idle_polling_interval_ms must be > 0",
            ));
        }
        if !(0.0..100.0).contains(&self.target_temperature_c) {
            return Err(ConfigError::ValidationFailed(
                "target_temperature_c must be in [0, 100)",
            ));
        }
        if !(self.hysteresis_c.is_finite() && self.hysteresis_c > 0.0) {
            return Err(ConfigError::ValidationFailed("hysteresis_c must be > 0"));
        }
        if !(self.duty_band_c.is_finite() && self.duty_band_c > 0.0) {
            return Err(ConfigError::ValidationFailed("duty_band_c must be > 0"));
        }
        if !(0.0..=MAX_INTERVAL_SECS).contains(&self.min_change_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "min_change_interval_secs must be in [0, 86400]",
            ));
        }
        if self.min_tick_sleep_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "min_tick_sleep_ms must be > 0",
            ));
        }
        if self.plug.update_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "plug.update_interval_ms must be > 0",
            ));
        }
        if self.telemetry.buffer_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "telemetry.buffer_size must be >= 1",
            ));
        }
        if self.telemetry.backup_count == 0 {
            return Err(ConfigError::ValidationFailed(
                "telemetry.backup_count must be >= 1",
            ));
        }
        if self.blink_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("blink_interval_ms must be > 0"));
        }
        if self.log_level.parse::<log::LevelFilter>().is_err() {
            return Err(ConfigError::ValidationFailed("log_level is not a log level"));
        }
        Ok(())
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs_f32(self.polling_interval_secs)
    }

    pub fn idle_polling_interval(&self) -> Duration {
        Duration::from_millis(self.idle_polling_interval_ms.into())
    }

    pub fn min_tick_sleep(&self) -> Duration {
        Duration::from_millis(self.min_tick_sleep_ms.into())
    }

    pub fn min_change_interval(&self) -> Duration {
        Duration::from_secs_f32(self.min_change_interval_secs)
    }

    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms.into())
    }
}

impl PlugConfig {
    pub fn min_op_interval(&self) -> Duration {
        Duration::from_millis(self.min_op_interval_ms.into())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms.into())
    }

    pub fn shutdown_settle(&self) -> Duration {
        Duration::from_millis(self.shutdown_settle_ms.into())
    }
}
