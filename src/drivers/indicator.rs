//! Heating indicator LED.
//!
//! Solid while the heater is commanded on, a 2 Hz blink while the bath is
//! active but not heating, dark otherwise.  The blink runs as its own task
//! on the executor so its timing does not depend on the control period.
//!
//! Leaving the blinking mode cancels the task and waits for it to stop.
//! The task holds an [`OffOnDrop`] guard, so whichever way it ends the LED
//! is left dark before the new steady level is driven.

use core::cell::RefCell;
use core::time::Duration;
use std::rc::Rc;

use edge_executor::Task;
use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::Executor;
use crate::app::ports::{IndicatorMode, IndicatorPort};

type SharedPin<P> = Rc<RefCell<P>>;

fn drive<P: OutputPin>(pin: &SharedPin<P>, lit: bool) {
    let result = if lit {
        pin.borrow_mut().set_high()
    } else {
        pin.borrow_mut().set_low()
    };
    if let Err(e) = result {
        warn!("indicator: pin write failed: {:?}", e);
    }
}

struct OffOnDrop<P: OutputPin>(SharedPin<P>);

impl<P: OutputPin> Drop for OffOnDrop<P> {
    fn drop(&mut self) {
        drive(&self.0, false);
    }
}

async fn blink<P: OutputPin>(pin: SharedPin<P>, half_period: Duration) {
    let guard = OffOnDrop(pin);
    let mut lit = false;
    loop {
        drive(&guard.0, lit);
        lit = !lit;
        async_io_mini::Timer::after(half_period).await;
    }
}

pub struct BlinkingIndicator<P> {
    executor: Rc<Executor>,
    pin: SharedPin<P>,
    half_period: Duration,
    mode: Option<IndicatorMode>,
    blink: Option<Task<()>>,
}

impl<P: OutputPin + 'static> BlinkingIndicator<P> {
    pub fn new(executor: Rc<Executor>, pin: P, half_period: Duration) -> Self {
        Self {
            executor,
            pin: Rc::new(RefCell::new(pin)),
            half_period,
            mode: None,
            blink: None,
        }
    }

    /// Last mode applied; `None` before the first call.
    pub fn mode(&self) -> Option<IndicatorMode> {
        self.mode
    }
}

impl<P: OutputPin + 'static> IndicatorPort for BlinkingIndicator<P> {
    async fn set_mode(&mut self, mode: IndicatorMode) {
        if self.mode == Some(mode) {
            return;
        }
        if let Some(task) = self.blink.take() {
            task.cancel().await;
        }
        match mode {
            IndicatorMode::Off => drive(&self.pin, false),
            IndicatorMode::Solid => drive(&self.pin, true),
            IndicatorMode::Blinking => {
                self.blink = Some(
                    self.executor
                        .spawn(blink(self.pin.clone(), self.half_period)),
                );
            }
        }
        debug!("indicator: {:?}", mode);
        self.mode = Some(mode);
    }
}
