//! Front-panel drivers and the worker-thread helper.
//!
//! Everything here sits behind an `embedded-hal` pin or a
//! [`SegmentPanel`](crate::app::ports::SegmentPanel), so the same code
//! drives real GPIO and the host simulation.

pub mod display;
pub mod indicator;
pub mod switch;
pub mod worker_thread;
