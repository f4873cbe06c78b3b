//! Actuator reconciler: decouples the heater *intent* from the plug's
//! rate-limited, unreliable physical actuation.
//!
//! ```text
//!  ControlLoop ──request_on/off──▶ ┌──────────────┐
//!                                  │  PlugState   │ intent · physical · last_op
//!  ControlLoop ◀──────query─────── └──────────────┘
//!                                     ▲       │
//!                          observe    │       │ intent
//!                                     │       ▼
//!                           ┌──────────────────────────┐
//!                           │ ReconcileCycle (task)    │──▶ PlugDevice
//!                           │ every update_interval    │
//!                           └──────────────────────────┘
//! ```
//!
//! Callers never block: a request only overwrites the intent.  The
//! background cycle polls the plug, and when the intent differs from what
//! it observed and the last executed command is at least `min_op_interval`
//! old, it sends exactly one command and optimistically records the new
//! state.  The intent is sticky, so a relay flipped behind our back is
//! corrected on the next eligible cycle.

use core::cell::RefCell;
use core::time::Duration;
use std::sync::Arc;

use edge_executor::{LocalExecutor, Task};
use embassy_sync::blocking_mutex::CriticalSectionMutex;
use log::{debug, info, warn};

use super::PhysicalState;
use crate::app::ports::{Clock, PlugDevice};
use crate::config::PlugConfig;

// ── Shared state ─────────────────────────────────────────────

#[derive(Debug, Default)]
struct PlugState {
    intent: Option<bool>,
    physical: PhysicalState,
    observed_at: Option<Duration>,
    last_op: Option<Duration>,
}

impl PlugState {
    /// Intent that has not yet been reflected in the observed state.
    fn pending(&self) -> Option<bool> {
        self.intent
            .filter(|want| self.physical != PhysicalState::from(*want))
    }
}

type SharedState = Arc<CriticalSectionMutex<RefCell<PlugState>>>;

#[derive(Debug, Clone, Copy)]
pub struct ReconcilerConfig {
    pub min_op_interval: Duration,
    pub update_interval: Duration,
}

impl From<&PlugConfig> for ReconcilerConfig {
    fn from(c: &PlugConfig) -> Self {
        Self {
            min_op_interval: c.min_op_interval(),
            update_interval: c.update_interval(),
        }
    }
}

// ── PlugHandle ───────────────────────────────────────────────

enum RequestOutcome {
    Fresh,
    Repeat,
    Superseded(bool),
}

/// Cheap, cloneable view of the reconciler used by the control loop and
/// the status surface.
#[derive(Clone)]
pub struct PlugHandle {
    state: SharedState,
}

impl PlugHandle {
    pub fn request_on(&self) {
        self.request(true);
    }

    pub fn request_off(&self) {
        self.request(false);
    }

    /// Cached physical state.  No I/O.
    pub fn query(&self) -> PhysicalState {
        self.state.lock(|s| s.borrow().physical)
    }

    pub fn intent(&self) -> Option<bool> {
        self.state.lock(|s| s.borrow().intent)
    }

    /// Clock reading of the last successful or failed poll.
    pub fn observed_at(&self) -> Option<Duration> {
        self.state.lock(|s| s.borrow().observed_at)
    }

    /// `true` when nothing is left for the cycle to do.
    pub fn is_settled(&self) -> bool {
        self.state.lock(|s| s.borrow().pending().is_none())
    }

    /// Wait until the plug has caught up with the intent, polling the cache
    /// every `poll`.  Returns `false` if `timeout` elapsed first.
    pub async fn settle(&self, timeout: Duration, poll: Duration) -> bool {
        let settled = async {
            while !self.is_settled() {
                async_io_mini::Timer::after(poll).await;
            }
            true
        };
        let expired = async {
            async_io_mini::Timer::after(timeout).await;
            false
        };
        futures_lite::future::or(settled, expired).await
    }

    fn request(&self, want: bool) {
        let outcome = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let outcome = match s.pending() {
                Some(prev) if prev != want => RequestOutcome::Superseded(prev),
                _ if s.intent == Some(want) => RequestOutcome::Repeat,
                _ => RequestOutcome::Fresh,
            };
            s.intent = Some(want);
            outcome
        });

        match outcome {
            RequestOutcome::Fresh => debug!("plug: intent -> {}", on_off(want)),
            RequestOutcome::Repeat => {}
            RequestOutcome::Superseded(prev) => warn!(
                "plug: turn {} requested while turn {} is still pending; keeping the latest",
                on_off(want),
                on_off(prev)
            ),
        }
    }
}

// ── ReconcileCycle ───────────────────────────────────────────

/// What a single cycle did.  Returned for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The plug could not be polled; state is now `Unknown`.
    PollFailed,
    /// Intent absent or already satisfied.
    Idle,
    /// A command is pending but the last one is too recent.
    RateLimited,
    /// A command was sent and acknowledged.
    Commanded(bool),
    /// A command was sent and failed; state is now `Unknown`.
    CommandFailed(bool),
}

/// The device-owning half of the reconciler.
pub struct ReconcileCycle<D, C> {
    state: SharedState,
    device: D,
    clock: C,
    min_op_interval: Duration,
}

impl<D: PlugDevice, C: Clock> ReconcileCycle<D, C> {
    /// Poll once and issue at most one command.
    pub async fn run_once(&mut self) -> CycleOutcome {
        let observed = self.device.is_on().await;
        let now = self.clock.now();

        let pending = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.observed_at = Some(now);
            match &observed {
                Ok(on) => {
                    s.physical = PhysicalState::from(*on);
                    Ok(s.pending().map(|want| (want, s.last_op)))
                }
                Err(_) => {
                    s.physical = PhysicalState::Unknown;
                    Err(())
                }
            }
        });

        let (want, last_op) = match pending {
            Err(()) => {
                if let Err(e) = observed {
                    warn!("plug: poll failed ({}); state unknown, retrying", e);
                }
                return CycleOutcome::PollFailed;
            }
            Ok(None) => return CycleOutcome::Idle,
            Ok(Some(p)) => p,
        };

        if let Some(last) = last_op {
            if now.saturating_sub(last) < self.min_op_interval {
                debug!("plug: turn {} deferred by rate limit", on_off(want));
                return CycleOutcome::RateLimited;
            }
        }

        let result = if want {
            self.device.turn_on().await
        } else {
            self.device.turn_off().await
        };

        match result {
            Ok(()) => {
                self.state.lock(|s| {
                    let mut s = s.borrow_mut();
                    s.last_op = Some(now);
                    s.physical = PhysicalState::from(want);
                });
                info!("plug: turned {}", on_off(want));
                CycleOutcome::Commanded(want)
            }
            Err(e) => {
                // Only acknowledged commands start the min_op_interval window,
                // so the retry may follow within it.
                self.state
                    .lock(|s| s.borrow_mut().physical = PhysicalState::Unknown);
                warn!("plug: turn {} failed ({}); will retry", on_off(want), e);
                CycleOutcome::CommandFailed(want)
            }
        }
    }

    /// Run forever with a fixed period.  Failures never end the loop.
    pub async fn run(mut self, period: Duration) {
        loop {
            self.run_once().await;
            async_io_mini::Timer::after(period).await;
        }
    }
}

// ── ActuatorReconciler ───────────────────────────────────────

/// Owns the plug device until the background cycle is started.
pub struct ActuatorReconciler<D, C> {
    handle: PlugHandle,
    cycle: Option<ReconcileCycle<D, C>>,
    update_interval: Duration,
    task: Option<Task<()>>,
}

impl<D: PlugDevice, C: Clock> ActuatorReconciler<D, C> {
    pub fn new(device: D, clock: C, config: ReconcilerConfig) -> Self {
        let state: SharedState = Arc::new(CriticalSectionMutex::new(RefCell::new(
            PlugState::default(),
        )));
        Self {
            handle: PlugHandle {
                state: state.clone(),
            },
            cycle: Some(ReconcileCycle {
                state,
                device,
                clock,
                min_op_interval: config.min_op_interval,
            }),
            update_interval: config.update_interval,
            task: None,
        }
    }

    pub fn handle(&self) -> PlugHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start the background cycle on `executor` unless it already runs.
    /// Safe to call every tick.
    pub fn ensure_running<'a>(&mut self, executor: &LocalExecutor<'a>)
    where
        D: 'a,
        C: 'a,
    {
        if self.task.is_some() {
            return;
        }
        let Some(cycle) = self.cycle.take() else {
            return;
        };
        info!("plug: reconciler started, period {:?}", self.update_interval);
        self.task = Some(executor.spawn(cycle.run(self.update_interval)));
    }

    /// Take the cycle out for manual stepping (tests, one-shot tools).
    /// `None` once the background task owns it.
    pub fn take_cycle(&mut self) -> Option<ReconcileCycle<D, C>> {
        self.cycle.take()
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}
