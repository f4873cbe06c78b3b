//! Runtime integration tests.
//!
//! Run the real executor with the reconciler as a background task and
//! check switch edges, tick pacing and the shutdown sequence end to end.

use std::fs;
use std::rc::Rc;
use std::time::Duration;

use async_io_mini::Timer;
use futures_lite::future::block_on;
use tempfile::TempDir;

use sousvide::Executor;
use sousvide::actuator::PhysicalState;
use sousvide::actuator::reconciler::{ActuatorReconciler, ReconcilerConfig};
use sousvide::app::events::AppEvent;
use sousvide::app::ports::IndicatorMode;
use sousvide::app::runtime::{Runtime, ShutdownSignal};
use sousvide::app::service::{ControlLoop, Peripherals};
use sousvide::config::SystemConfig;
use sousvide::telemetry::TelemetryLogger;

use crate::mock_hw::{
    DisplayCall, ManualClock, MockDisplay, MockIndicator, MockPlug, MockSwitch, MockThermometer,
    RecordingSink,
};

type TestRuntime = Runtime<
    MockSwitch,
    MockThermometer,
    MockDisplay,
    MockIndicator,
    MockPlug,
    ManualClock,
    RecordingSink,
>;

struct Setup {
    executor: Rc<Executor>,
    runtime: TestRuntime,
    plug: MockPlug,
    switch: MockSwitch,
    dir: TempDir,
}

fn setup(readings: &[f32]) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SystemConfig::default();
    config.min_change_interval_secs = 0.0;
    config.plug.min_op_interval_ms = 0;
    config.plug.update_interval_ms = 10;
    config.plug.shutdown_settle_ms = 500;
    config.telemetry.path = dir.path().join("heating_log.tsv");

    let executor = Rc::new(Executor::new());
    let plug = MockPlug::new();
    let clock = ManualClock::default();
    let switch = MockSwitch::default();
    let reconciler =
        ActuatorReconciler::new(plug.clone(), clock.clone(), ReconcilerConfig::from(&config.plug));
    let control = ControlLoop::new(
        &config,
        reconciler.handle(),
        TelemetryLogger::new(&config.telemetry),
    );
    let hw = Peripherals {
        switch: switch.clone(),
        thermometer: MockThermometer::with(readings.iter().copied().map(Ok)),
        display: MockDisplay::default(),
        indicator: MockIndicator::default(),
    };
    let runtime = Runtime::new(
        executor.clone(),
        &config,
        control,
        hw,
        reconciler,
        clock,
        RecordingSink::default(),
    );

    Setup {
        executor,
        runtime,
        plug,
        switch,
        dir,
    }
}

#[test]
fn switch_edges_drive_the_plug_through_the_reconciler() {
    let Setup {
        executor,
        mut runtime,
        plug,
        switch,
        dir: _dir,
    } = setup(&[50.0, 50.0]);

    let (plug, runtime) = block_on(executor.run(async move {
        switch.0.set(true);
        let sleep = runtime.step().await;
        assert_eq!(sleep, Duration::from_secs(1));
        Timer::after(Duration::from_millis(60)).await;
        assert!(plug.is_relay_on());

        switch.0.set(false);
        let sleep = runtime.step().await;
        assert_eq!(sleep, Duration::from_millis(200));
        Timer::after(Duration::from_millis(60)).await;
        assert!(!plug.is_relay_on());

        (plug, runtime)
    }));

    assert_eq!(plug.commands(), vec![true, false]);
    let hw = runtime.peripherals();
    assert_eq!(hw.display.last(), Some(&DisplayCall::Clear));
    assert_eq!(hw.indicator.last(), Some(IndicatorMode::Off));
    assert_eq!(
        runtime
            .sink()
            .count(|e| matches!(e, AppEvent::SwitchChanged { .. })),
        2
    );
}

#[test]
fn unchanged_switch_is_not_an_edge() {
    let Setup {
        executor,
        mut runtime,
        dir: _dir,
        ..
    } = setup(&[]);

    let runtime = block_on(executor.run(async move {
        runtime.step().await;
        runtime.step().await;
        runtime.step().await;
        runtime
    }));

    // The first observation counts as an edge, the rest do not.
    assert_eq!(
        runtime
            .sink()
            .count(|e| matches!(e, AppEvent::SwitchChanged { on: false })),
        1
    );
    assert!(!runtime.control().is_active());
}

#[test]
fn shutdown_signal_turns_heater_off_and_flushes() {
    let Setup {
        executor,
        runtime,
        plug,
        switch,
        dir,
    } = setup(&[50.0]);
    switch.0.set(true);

    // Raised up front: the loop completes one iteration, then stops.
    let signal = ShutdownSignal::new();
    signal.signal(());
    let runtime = block_on(executor.run(runtime.run(&signal)));

    assert!(!plug.is_relay_on());
    assert_eq!(runtime.control().plug().query(), PhysicalState::Off);
    assert_eq!(runtime.control().plug().intent(), Some(false));

    let hw = runtime.peripherals();
    assert_eq!(hw.display.last(), Some(&DisplayCall::Clear));
    assert_eq!(hw.indicator.last(), Some(IndicatorMode::Off));

    let events = &runtime.sink().events;
    assert!(matches!(events.first(), Some(AppEvent::Started { .. })));
    assert_eq!(events.last(), Some(&AppEvent::Stopped));

    let log = fs::read_to_string(dir.path().join("heating_log.tsv")).unwrap();
    assert_eq!(log.lines().count(), 1);
}
