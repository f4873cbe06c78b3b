//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (the binary routes it to stderr via `tracing-subscriber`).
//! A dashboard adapter would implement the same trait.

use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                mode,
                strategy,
                target,
            } => {
                info!(
                    "START | mode={:?} | strategy={} | target={:.1}\u{00b0}C",
                    mode, strategy, target
                );
            }
            AppEvent::SwitchChanged { on } => {
                info!("SWITCH | {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::Sample(s) => {
                info!(
                    "TELEM | T={:.2}\u{00b0}C | target={:.1}\u{00b0}C | plug={:?}",
                    s.temperature, s.target, s.plug
                );
            }
            AppEvent::HeaterRequested { on, temperature } => {
                info!(
                    "HEATER | request {} at {:.2}\u{00b0}C",
                    if *on { "ON" } else { "OFF" },
                    temperature
                );
            }
            AppEvent::FailSafe(e) => {
                error!("FAULT | {} | heater forced OFF", e);
            }
            AppEvent::Stopped => {
                info!("STOP | heater OFF, telemetry flushed");
            }
        }
    }
}
