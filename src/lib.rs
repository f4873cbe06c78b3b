//! Sous-vide bath controller library.
//!
//! Exposes the control core, its adapters and drivers for the binary and
//! for integration testing.  Hardware-specific pieces sit behind the port
//! traits in [`app::ports`]; the `sim` adapters stand in for them on a
//! development host.

#![deny(unused_must_use)]

pub mod actuator;
pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod sensors;
pub mod telemetry;

mod error;
mod pins;

/// Single-threaded executor shared by the runtime, the plug reconciler and
/// the indicator blink task.
pub type Executor = edge_executor::LocalExecutor<'static>;
