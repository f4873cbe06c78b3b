//! Main loop: switch edges, tick pacing and orderly shutdown.
//!
//! Runs on the single-threaded executor next to the plug reconciler and
//! the indicator blink task.  Each iteration:
//!
//! 1. sample the switch and forward edges to the [`ControlLoop`];
//! 2. make sure the reconciler task is alive;
//! 3. run one control tick;
//! 4. sleep for whatever remains of the period, never less than the floor.
//!
//! A raised [`ShutdownSignal`] ends the loop at the next await point and
//! turns the heater off before returning.

use core::time::Duration;
use std::rc::Rc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{info, warn};

use crate::Executor;
use crate::actuator::reconciler::ActuatorReconciler;
use crate::config::SystemConfig;

use super::ports::{Clock, DisplayPort, EventSink, IndicatorPort, PlugDevice, SwitchPort, TemperatureSource};
use super::service::{ControlLoop, Peripherals};

/// Raised from the Ctrl-C handler thread.
pub type ShutdownSignal = Signal<CriticalSectionRawMutex, ()>;

const SETTLE_POLL: Duration = Duration::from_millis(100);

/// Sleep for the rest of `period`, or `floor` if the tick overran it.
pub fn remaining_sleep(period: Duration, elapsed: Duration, floor: Duration) -> Duration {
    let remaining = period.saturating_sub(elapsed);
    if remaining < floor {
        warn!(
            "tick took {:?} of a {:?} period; sleeping {:?} instead",
            elapsed, period, floor
        );
        floor
    } else {
        remaining
    }
}

#[derive(Debug, Clone, Copy)]
struct Pacing {
    active: Duration,
    idle: Duration,
    floor: Duration,
    settle_timeout: Duration,
}

pub struct Runtime<Sw, T, D, I, P, C, E> {
    executor: Rc<Executor>,
    control: ControlLoop,
    hw: Peripherals<Sw, T, D, I>,
    reconciler: ActuatorReconciler<P, C>,
    clock: C,
    sink: E,
    pacing: Pacing,
    last_switch: Option<bool>,
}

impl<Sw, T, D, I, P, C, E> Runtime<Sw, T, D, I, P, C, E>
where
    Sw: SwitchPort,
    T: TemperatureSource,
    D: DisplayPort,
    I: IndicatorPort,
    P: PlugDevice + 'static,
    C: Clock + 'static,
    E: EventSink,
{
    pub fn new(
        executor: Rc<Executor>,
        config: &SystemConfig,
        control: ControlLoop,
        hw: Peripherals<Sw, T, D, I>,
        reconciler: ActuatorReconciler<P, C>,
        clock: C,
        sink: E,
    ) -> Self {
        Self {
            executor,
            control,
            hw,
            reconciler,
            clock,
            sink,
            pacing: Pacing {
                active: config.polling_interval(),
                idle: config.idle_polling_interval(),
                floor: config.min_tick_sleep(),
                settle_timeout: config.plug.shutdown_settle(),
            },
            last_switch: None,
        }
    }

    /// One loop iteration without the sleep.  Returns how long to sleep.
    pub async fn step(&mut self) -> Duration {
        let started = self.clock.now();
        let on = self.hw.switch.is_on();

        if self.last_switch != Some(on) {
            self.last_switch = Some(on);
            self.control
                .on_switch_changed(on, &mut self.hw, &mut self.sink);
        }

        self.reconciler.ensure_running(&self.executor);
        self.control
            .tick(&mut self.hw, self.clock.now(), &mut self.sink)
            .await;

        let period = if on { self.pacing.active } else { self.pacing.idle };
        remaining_sleep(period, self.clock.now().saturating_sub(started), self.pacing.floor)
    }

    /// Run until `shutdown` is raised, then turn everything off.
    pub async fn run(mut self, shutdown: &ShutdownSignal) -> Self {
        self.control.start(&mut self.sink);
        futures_lite::future::or(self.run_forever(), shutdown.wait()).await;
        self.shutdown().await;
        self
    }

    async fn run_forever(&mut self) {
        loop {
            let sleep = self.step().await;
            async_io_mini::Timer::after(sleep).await;
        }
    }

    /// Blank the panel, request OFF, give the plug time to confirm, flush.
    pub async fn shutdown(&mut self) {
        info!("shutting down: heater OFF");
        self.control.shutdown(&mut self.hw, &mut self.sink).await;

        // A shutdown before the first tick still needs a cycle to send OFF.
        self.reconciler.ensure_running(&self.executor);
        let poll = SETTLE_POLL.min(self.pacing.settle_timeout);
        if !self
            .control
            .plug()
            .settle(self.pacing.settle_timeout, poll)
            .await
        {
            warn!(
                "plug did not confirm OFF within {:?}; state {:?}",
                self.pacing.settle_timeout,
                self.control.plug().query()
            );
        }
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    pub fn peripherals(&self) -> &Peripherals<Sw, T, D, I> {
        &self.hw
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals<Sw, T, D, I> {
        &mut self.hw
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }
}
