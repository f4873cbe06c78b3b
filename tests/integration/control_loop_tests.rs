//! ControlLoop integration tests.
//!
//! Drive the loop tick by tick against mock ports, stepping the plug
//! reconciler by hand so every command is observable.

use std::fs;
use std::time::Duration;

use futures_lite::future::block_on;
use tempfile::TempDir;

use sousvide::actuator::PhysicalState;
use sousvide::actuator::reconciler::{ActuatorReconciler, CycleOutcome, ReconcileCycle, ReconcilerConfig};
use sousvide::app::events::AppEvent;
use sousvide::app::ports::{Clock, IndicatorMode, SensorError};
use sousvide::app::service::{ControlLoop, Peripherals};
use sousvide::config::{Mode, StrategyKind, SystemConfig};
use sousvide::telemetry::{LogRecord, TelemetryLogger};

use crate::mock_hw::{
    DisplayCall, ManualClock, MockDisplay, MockIndicator, MockPlug, MockSwitch, MockThermometer,
    RecordingSink,
};

type Hw = Peripherals<MockSwitch, MockThermometer, MockDisplay, MockIndicator>;

struct Rig {
    control: ControlLoop,
    hw: Hw,
    sink: RecordingSink,
    cycle: ReconcileCycle<MockPlug, ManualClock>,
    plug: MockPlug,
    clock: ManualClock,
    dir: TempDir,
}

impl Rig {
    fn new(mut config: SystemConfig) -> Self {
        config.min_change_interval_secs = 0.0;
        Self::with_debounce(config)
    }

    /// Keeps the configured `min_change_interval_secs`.
    fn with_debounce(mut config: SystemConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        config.telemetry.path = dir.path().join("heating_log.tsv");

        let plug = MockPlug::new();
        let clock = ManualClock::default();
        let mut reconciler = ActuatorReconciler::new(
            plug.clone(),
            clock.clone(),
            ReconcilerConfig::from(&config.plug),
        );
        let cycle = reconciler.take_cycle().unwrap();
        let telemetry = TelemetryLogger::new(&config.telemetry);
        let control = ControlLoop::new(&config, reconciler.handle(), telemetry);

        Self {
            control,
            hw: Peripherals {
                switch: MockSwitch::default(),
                thermometer: MockThermometer::default(),
                display: MockDisplay::default(),
                indicator: MockIndicator::default(),
            },
            sink: RecordingSink::default(),
            cycle,
            plug,
            clock,
            dir,
        }
    }

    fn switch(&mut self, on: bool) {
        self.control.on_switch_changed(on, &mut self.hw, &mut self.sink);
    }

    fn tick_with(&mut self, reading: Result<f32, SensorError>) {
        self.hw.thermometer.push(reading);
        let now = self.clock.now();
        block_on(self.control.tick(&mut self.hw, now, &mut self.sink));
    }

    fn reconcile(&mut self) -> CycleOutcome {
        block_on(self.cycle.run_once())
    }

    fn log_lines(&self) -> Vec<LogRecord> {
        let text = fs::read_to_string(self.dir.path().join("heating_log.tsv")).unwrap_or_default();
        text.lines().filter_map(LogRecord::parse_line).collect()
    }
}

// ── Active ticks ──────────────────────────────────────────────

#[test]
fn cold_bath_requests_heat_and_lights_indicator() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Ok(50.0));

    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Temperature(50.0)));
    assert_eq!(rig.control.plug().intent(), Some(true));
    assert_eq!(rig.control.last_desired(), Some(true));
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Solid));
    assert_eq!(rig.control.telemetry().buffered(), 1);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::HeaterRequested { on: true, .. })),
        1
    );

    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(true));
    assert!(rig.plug.is_relay_on());
    assert_eq!(rig.control.plug().query(), PhysicalState::On);
}

#[test]
fn hot_bath_blinks_while_idle() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Ok(70.0));

    assert_eq!(rig.control.plug().intent(), Some(false));
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Blinking));
}

#[test]
fn duty_zone_toggles_against_observed_plug() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);

    rig.tick_with(Ok(50.0));
    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(true));

    // 60 °C sits in the duty band with the plug seen ON, so the loop asks
    // for OFF.  The reconciler holds it back until min_op_interval passes.
    rig.tick_with(Ok(60.0));
    assert_eq!(rig.control.plug().intent(), Some(false));
    assert_eq!(rig.reconcile(), CycleOutcome::RateLimited);
    assert!(rig.plug.is_relay_on());

    rig.clock.advance(Duration::from_secs(1));
    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(false));
    assert_eq!(rig.plug.commands(), vec![true, false]);
}

#[test]
fn unknown_plug_is_logged_as_not_heating() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Ok(50.0));
    assert_eq!(rig.control.plug().query(), PhysicalState::Unknown);

    rig.control.telemetry_mut().flush();
    let lines = rig.log_lines();
    assert_eq!(lines.len(), 1);
    assert!((lines[0].temperature - 50.0).abs() < 0.005);
    assert!(!lines[0].heating);
}

#[test]
fn heating_flag_follows_observed_plug() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Ok(50.0));
    rig.reconcile();
    rig.tick_with(Ok(51.0));

    rig.control.telemetry_mut().flush();
    let heating: Vec<bool> = rig.log_lines().iter().map(|r| r.heating).collect();
    assert_eq!(heating, vec![false, true]);
}

// ── Fail-safe ─────────────────────────────────────────────────

#[test]
fn read_failure_shows_error_and_forces_off() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Ok(50.0));
    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(true));

    rig.tick_with(Err(SensorError::ReadFailed("crc mismatch".into())));

    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Text("Err".into())));
    assert_eq!(rig.control.plug().intent(), Some(false));
    assert_eq!(rig.control.last_desired(), Some(false));
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Blinking));
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::FailSafe(_))),
        1
    );
    // Nothing is logged for a tick without a reading.
    assert_eq!(rig.control.telemetry().buffered(), 1);

    rig.clock.advance(Duration::from_secs(1));
    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(false));
    assert!(!rig.plug.is_relay_on());
}

#[test]
fn loop_recovers_after_read_failure() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Err(SensorError::Timeout));
    rig.tick_with(Ok(40.0));

    assert_eq!(rig.control.plug().intent(), Some(true));
    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Temperature(40.0)));
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Solid));
}

// ── Switch handling ───────────────────────────────────────────

#[test]
fn switch_off_while_active_turns_everything_off() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Ok(50.0));
    rig.reconcile();
    assert!(rig.plug.is_relay_on());

    rig.switch(false);
    assert!(!rig.control.is_active());
    assert_eq!(rig.control.plug().intent(), Some(false));
    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Clear));

    // Inactive ticks do not read the probe.
    let now = rig.clock.now();
    block_on(rig.control.tick(&mut rig.hw, now, &mut rig.sink));
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Off));
    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Clear));
    assert_eq!(rig.control.telemetry().buffered(), 1);

    rig.clock.advance(Duration::from_secs(1));
    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(false));
    assert!(!rig.plug.is_relay_on());
}

#[test]
fn switch_detect_only_reports_edges() {
    let mut rig = Rig::new(SystemConfig {
        mode: Mode::SwitchDetect,
        ..SystemConfig::default()
    });
    rig.control.plug().request_on();

    rig.switch(true);
    rig.switch(false);

    assert!(rig.hw.display.calls.is_empty());
    assert_eq!(rig.control.plug().intent(), Some(true));
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::SwitchChanged { .. })),
        2
    );

    // The inactive tick still re-asserts OFF.
    let now = rig.clock.now();
    block_on(rig.control.tick(&mut rig.hw, now, &mut rig.sink));
    assert_eq!(rig.control.plug().intent(), Some(false));
}

#[test]
fn reactivation_inside_debounce_window_does_not_show_stale_heating() {
    let mut rig = Rig::with_debounce(SystemConfig {
        mode: Mode::SwitchDetect,
        min_change_interval_secs: 10.0,
        ..SystemConfig::default()
    });
    rig.switch(true);

    // First observation opens the window; the decision comes 10 s later.
    rig.tick_with(Ok(40.0));
    assert_eq!(rig.control.plug().intent(), None);
    rig.clock.advance(Duration::from_secs(10));
    rig.tick_with(Ok(40.0));
    assert_eq!(rig.control.last_desired(), Some(true));
    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(true));

    // Seeing the plug ON restarts the window.
    rig.tick_with(Ok(40.0));
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Solid));

    rig.switch(false);
    let now = rig.clock.now();
    block_on(rig.control.tick(&mut rig.hw, now, &mut rig.sink));
    rig.clock.advance(Duration::from_secs(1));
    assert_eq!(rig.reconcile(), CycleOutcome::Commanded(false));
    assert_eq!(rig.control.last_desired(), Some(false));

    // Back on: the strategy is still debouncing, so nothing new is forwarded.
    rig.switch(true);
    rig.tick_with(Ok(40.0));
    assert_eq!(rig.control.plug().intent(), Some(false));
    assert!(!rig.plug.is_relay_on());
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Blinking));
}

#[test]
fn threshold_strategy_is_selected_from_config() {
    let mut rig = Rig::new(SystemConfig {
        strategy: StrategyKind::Threshold,
        target_temperature_c: 60.0,
        hysteresis_c: 2.0,
        ..SystemConfig::default()
    });
    rig.switch(true);
    rig.control.start(&mut rig.sink);
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::Started {
            strategy: "threshold",
            ..
        })
    ));

    // Threshold switches at 58 °C, so 59 °C means OFF.
    rig.tick_with(Ok(59.0));
    assert_eq!(rig.control.plug().intent(), Some(false));
}

// ── Shutdown ──────────────────────────────────────────────────

#[test]
fn shutdown_blanks_panel_and_flushes_log() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.switch(true);
    rig.tick_with(Ok(50.0));
    rig.tick_with(Ok(51.0));

    block_on(rig.control.shutdown(&mut rig.hw, &mut rig.sink));

    assert_eq!(rig.hw.display.last(), Some(&DisplayCall::Clear));
    assert_eq!(rig.hw.indicator.last(), Some(IndicatorMode::Off));
    assert_eq!(rig.control.plug().intent(), Some(false));
    assert_eq!(rig.control.telemetry().buffered(), 0);
    assert_eq!(rig.log_lines().len(), 2);
    assert_eq!(rig.sink.events.last(), Some(&AppEvent::Stopped));
}
