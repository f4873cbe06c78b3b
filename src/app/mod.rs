//! Application core.
//!
//! The control loop, its runtime and the read-only status surface.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], so this layer runs against mocks in the integration tests.

pub mod events;
pub mod ports;
pub mod runtime;
pub mod service;
pub mod status;
