//! Sensor subsystem: the bath thermometer.
//!
//! The raw probe is an external collaborator behind
//! [`TemperatureProbe`](crate::app::ports::TemperatureProbe); this module
//! wraps it with thread offloading, range checking and history.

pub mod thermometer;

pub use thermometer::{HISTORY_CAPACITY, TemperatureHistory, TemperatureSample, Thermometer};
