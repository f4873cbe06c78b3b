//! Sous-vide controller: main entry point.
//!
//! Hexagonal architecture on a single-threaded executor.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimProbe ─▶ Thermometer   SimPlug    LogPanel    SimPins      │
//! │  (probe thread)            (plug)     (display)   (switch/LED) │
//! │  YamlConfigAdapter   LogEventSink   MonotonicClock             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │     Runtime ─▶ ControlLoop (strategy · telemetry)      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ActuatorReconciler task · indicator blink task                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use sousvide::Executor;
use sousvide::actuator::reconciler::{ActuatorReconciler, ReconcilerConfig};
use sousvide::adapters::config_file::YamlConfigAdapter;
use sousvide::adapters::log_sink::LogEventSink;
use sousvide::adapters::sim::{LogPanel, SimBath, SimInputPin, SimOutputPin, SimPlug, SimProbe};
use sousvide::adapters::time::MonotonicClock;
use sousvide::app::ports::{ConfigError, ConfigPort};
use sousvide::app::runtime::{Runtime, ShutdownSignal};
use sousvide::app::service::{ControlLoop, Peripherals};
use sousvide::app::status::SystemStatus;
use sousvide::config::SystemConfig;
use sousvide::drivers::display::PanelDisplay;
use sousvide::drivers::indicator::BlinkingIndicator;
use sousvide::drivers::switch::GpioSwitch;
use sousvide::sensors::Thermometer;
use sousvide::telemetry::TelemetryLogger;

static SHUTDOWN: ShutdownSignal = ShutdownSignal::new();

#[derive(Parser, Debug)]
#[command(name = "sousvide")]
#[command(about = "Sous-vide bath controller driving a smart-plug heater")]
#[command(version)]
struct Cli {
    /// YAML configuration file; defaults apply if it does not exist
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Override the configured log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Start with the front-panel switch in the OFF position
    #[arg(long)]
    switch_off: bool,

    /// Initial temperature of the simulated bath (°C)
    #[arg(long, default_value_t = 21.0)]
    start_temp: f32,

    /// Make every n-th simulated plug request time out (0 = never)
    #[arg(long, default_value_t = 0)]
    plug_fault_every: u32,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── 1. Configuration and logging ──────────────────────────
    // Loaded before the subscriber exists so the file can pick the level;
    // the outcome is reported once logging is up.
    let config_adapter = YamlConfigAdapter::new(&cli.config);
    let loaded = config_adapter.load();

    let level_name = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.log_level.clone()))
        .unwrap_or_else(|| String::from("info"));
    let level: LevelFilter = level_name
        .parse()
        .with_context(|| format!("invalid log level '{}'", level_name))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    info!("╔══════════════════════════════════════╗");
    info!("║  SousVide v{:<26}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = match loaded {
        Ok(cfg) => cfg,
        Err(ConfigError::NotFound(path)) => {
            warn!("{} not found, using defaults", path.display());
            SystemConfig::default()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("loading {}", cli.config.display()));
        }
    };

    // ── 2. Shutdown signal ────────────────────────────────────
    ctrlc::set_handler(|| {
        SHUTDOWN.signal(());
    })
    .context("installing Ctrl-C handler")?;

    // ── 3. Construct adapters ─────────────────────────────────
    let executor = Rc::new(Executor::new());
    let clock = MonotonicClock::new();
    let bath = SimBath::new(cli.start_temp);

    let thermometer = Thermometer::spawn(SimProbe::new(bath.clone()))
        .context("spawning probe worker")?;
    let plug = SimPlug::new(bath).fail_every(cli.plug_fault_every);
    let reconciler = ActuatorReconciler::new(plug, clock, ReconcilerConfig::from(&config.plug));

    let status = SystemStatus::new(
        thermometer.history(),
        reconciler.handle(),
        config.target_temperature_c,
    );

    let switch_pin = SimInputPin::new(cli.switch_off);
    let hw = Peripherals {
        switch: GpioSwitch::new(switch_pin),
        thermometer,
        display: PanelDisplay::new(LogPanel::default()),
        indicator: BlinkingIndicator::new(
            executor.clone(),
            SimOutputPin::new(config.pins.power_led),
            config.blink_interval(),
        ),
    };

    // ── 4. Control loop ───────────────────────────────────────
    let control = ControlLoop::new(
        &config,
        reconciler.handle(),
        TelemetryLogger::new(&config.telemetry),
    );
    let runtime = Runtime::new(
        executor.clone(),
        &config,
        control,
        hw,
        reconciler,
        clock,
        LogEventSink::new(),
    );

    info!("Entering control loop (Ctrl-C to stop)");
    futures_lite::future::block_on(executor.run(runtime.run(&SHUTDOWN)));

    // ── 5. Exit report ────────────────────────────────────────
    let snapshot = status.snapshot();
    info!("final status: {}", snapshot.to_json()?);
    info!(
        "{} samples recorded this session",
        status.temperature_history().len()
    );
    Ok(())
}
