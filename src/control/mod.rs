//! Temperature control: heater decision strategies.

pub mod strategy;

pub use strategy::{ControlStrategy, Debounce, Threshold, TwoPhase};
