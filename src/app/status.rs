//! Read-only status surface.
//!
//! A cheap, cloneable view for a dashboard or the exit report: latest
//! bath temperature, target, and what the plug is believed to be doing.
//! Reads only cached state, never the probe or the network.

use serde::Serialize;

use crate::actuator::reconciler::PlugHandle;
use crate::sensors::{TemperatureHistory, TemperatureSample};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub temperature: Option<f32>,
    pub target: f32,
    /// `None` while the plug state is unknown.
    pub heating: Option<bool>,
}

impl StatusSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Clone)]
pub struct SystemStatus {
    history: TemperatureHistory,
    plug: PlugHandle,
    target: f32,
}

impl SystemStatus {
    pub fn new(history: TemperatureHistory, plug: PlugHandle, target: f32) -> Self {
        Self {
            history,
            plug,
            target,
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            temperature: self.history.latest().map(|s| s.celsius),
            target: self.target,
            heating: self.plug.query().as_bool(),
        }
    }

    /// Recorded samples, oldest first.
    pub fn temperature_history(&self) -> Vec<TemperatureSample> {
        self.history.samples()
    }
}
