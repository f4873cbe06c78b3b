//! Default GPIO assignments for the controller board (BCM numbering).
//!
//! Single source of truth for the factory wiring.  Every field of
//! [`PinConfig`](crate::config::PinConfig) defaults to a value from here, so a
//! config file only needs to mention pins that differ from the stock board.

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Front-panel rocker switch.  Pulled up; LOW = switch ON.
pub const SWITCH_INPUT_GPIO: u8 = 17;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Heating indicator LED (active HIGH).
pub const POWER_LED_GPIO: u8 = 10;

/// TM1637 4-digit display clock line.
pub const DISPLAY_CLK_GPIO: u8 = 22;
/// TM1637 4-digit display data line.
pub const DISPLAY_DIO_GPIO: u8 = 27;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// 1-Wire bus carrying the DS18B20 bath probe.
pub const ONE_WIRE_GPIO: u8 = 4;
