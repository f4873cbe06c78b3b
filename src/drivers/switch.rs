//! Front-panel rocker switch.
//!
//! Wired to ground with the internal pull-up enabled, so the pin reads
//! LOW while the switch is ON.  A failed read is reported as OFF, which
//! drops the controller into its safe inactive state.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::SwitchPort;

pub struct GpioSwitch<P> {
    pin: P,
}

impl<P: InputPin> GpioSwitch<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> SwitchPort for GpioSwitch<P> {
    fn is_on(&mut self) -> bool {
        self.pin.is_low().unwrap_or_else(|e| {
            warn!("switch: read failed ({:?}); treating as OFF", e);
            false
        })
    }
}
