//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements           | Connects to                 |
//! |----------------|----------------------|-----------------------------|
//! | `config_file`  | ConfigPort           | `config.yaml` on disk       |
//! | `log_sink`     | EventSink            | Console log output          |
//! | `sim`          | TemperatureProbe     | Simulated water bath        |
//! |                | PlugDevice           | Simulated smart plug        |
//! |                | SegmentPanel, pins   | Log output                  |
//! | `time`         | Clock                | Monotonic host clock        |

pub mod config_file;
pub mod log_sink;
pub mod sim;
pub mod time;
