//! Heater actuation: rate-limited reconciliation of the smart plug.

pub mod reconciler;

use serde::Serialize;

/// Last observed state of the outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalState {
    On,
    Off,
    /// The last poll or command failed; nothing is known about the relay.
    #[default]
    Unknown,
}

impl PhysicalState {
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::On => Some(true),
            Self::Off => Some(false),
            Self::Unknown => None,
        }
    }
}

impl From<bool> for PhysicalState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}
