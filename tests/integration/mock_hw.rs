//! Mock adapters for integration tests.
//!
//! Every port records what the control loop did to it so tests can assert
//! on the full call history without touching a real plug or panel.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use sousvide::app::events::AppEvent;
use sousvide::app::ports::{
    Clock, ConnectionError, DisplayPort, EventSink, IndicatorMode, IndicatorPort, PlugDevice,
    SensorError, SwitchPort, TemperatureSource,
};

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

#[allow(dead_code)]
impl ManualClock {
    pub fn set(&self, at: Duration) {
        self.0.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

// ── Thermometer ───────────────────────────────────────────────

/// Hands out scripted readings, then fails once the script runs dry.
#[derive(Default)]
pub struct MockThermometer {
    readings: RefCell<VecDeque<Result<f32, SensorError>>>,
    last: Cell<Option<f32>>,
}

#[allow(dead_code)]
impl MockThermometer {
    pub fn with(readings: impl IntoIterator<Item = Result<f32, SensorError>>) -> Self {
        Self {
            readings: RefCell::new(readings.into_iter().collect()),
            last: Cell::new(None),
        }
    }

    pub fn push(&self, reading: Result<f32, SensorError>) {
        self.readings.borrow_mut().push_back(reading);
    }
}

impl TemperatureSource for MockThermometer {
    async fn read_temperature(&self) -> Result<f32, SensorError> {
        let reading = self
            .readings
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SensorError::ReadFailed("script exhausted".into())));
        if let Ok(t) = reading {
            self.last.set(Some(t));
        }
        reading
    }

    fn last_temperature(&self) -> Option<f32> {
        self.last.get()
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Temperature(f32),
    Text(String),
    Clear,
}

#[derive(Default)]
pub struct MockDisplay {
    pub calls: Vec<DisplayCall>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn last(&self) -> Option<&DisplayCall> {
        self.calls.last()
    }
}

impl DisplayPort for MockDisplay {
    fn show_temperature(&mut self, celsius: f32) {
        self.calls.push(DisplayCall::Temperature(celsius));
    }

    fn show_text(&mut self, text: &str) {
        self.calls.push(DisplayCall::Text(text.to_string()));
    }

    fn clear(&mut self) {
        self.calls.push(DisplayCall::Clear);
    }
}

// ── Indicator ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockIndicator {
    pub modes: Vec<IndicatorMode>,
}

#[allow(dead_code)]
impl MockIndicator {
    pub fn last(&self) -> Option<IndicatorMode> {
        self.modes.last().copied()
    }
}

impl IndicatorPort for MockIndicator {
    async fn set_mode(&mut self, mode: IndicatorMode) {
        self.modes.push(mode);
    }
}

// ── Switch ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockSwitch(pub Rc<Cell<bool>>);

impl SwitchPort for MockSwitch {
    fn is_on(&mut self) -> bool {
        self.0.get()
    }
}

// ── Plug ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Relay {
    pub on: bool,
    pub commands: Vec<bool>,
    pub reachable: bool,
}

/// Instant-response plug; the test keeps a handle on the relay.
#[derive(Clone)]
pub struct MockPlug(pub Rc<RefCell<Relay>>);

#[allow(dead_code)]
impl MockPlug {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Relay {
            reachable: true,
            ..Relay::default()
        })))
    }

    pub fn is_relay_on(&self) -> bool {
        self.0.borrow().on
    }

    pub fn commands(&self) -> Vec<bool> {
        self.0.borrow().commands.clone()
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.0.borrow_mut().reachable = reachable;
    }

    fn command(&self, on: bool) -> Result<(), ConnectionError> {
        let mut relay = self.0.borrow_mut();
        if !relay.reachable {
            return Err(ConnectionError::Timeout);
        }
        relay.on = on;
        relay.commands.push(on);
        Ok(())
    }
}

impl PlugDevice for MockPlug {
    async fn turn_on(&mut self) -> Result<(), ConnectionError> {
        self.command(true)
    }

    async fn turn_off(&mut self) -> Result<(), ConnectionError> {
        self.command(false)
    }

    async fn is_on(&mut self) -> Result<bool, ConnectionError> {
        let relay = self.0.borrow();
        if relay.reachable {
            Ok(relay.on)
        } else {
            Err(ConnectionError::Unreachable("mock".into()))
        }
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
