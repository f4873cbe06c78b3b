//! Bath thermometer: offloaded probe reads plus a bounded sample history.
//!
//! ```text
//!   executor                            "probe" thread
//!  ┌───────────────────┐  Read(seq)   ┌──────────────────────┐
//!  │ read_temperature  │─────────────▶│ TemperatureProbe     │
//!  │   (async, ≤ 2 s)  │◀─────────────│   .read_celsius()    │
//!  └───────────────────┘ (seq, °C)    │   (blocking, ~750ms) │
//!           │                         └──────────────────────┘
//!           ▼
//!   HistoryBuffer<3600>  ◀── status surface
//! ```
//!
//! Replies carry the request sequence number, so a reply that belongs to
//! a read abandoned at shutdown or on timeout is discarded instead of being
//! mistaken for a fresh one.

use core::cell::RefCell;
use core::time::Duration;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::{Local, NaiveDateTime};
use embassy_sync::blocking_mutex::CriticalSectionMutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::HistoryBuffer;
use log::{debug, info};
use serde::Serialize;

use crate::app::ports::{SensorError, TemperatureProbe, TemperatureSource};
use crate::drivers::worker_thread::spawn_worker;

/// Samples kept for the status surface (one hour at 1 Hz).
pub const HISTORY_CAPACITY: usize = 3600;

/// Plausible range of an immersion probe; anything outside is a wiring fault.
const VALID_RANGE_C: core::ops::RangeInclusive<f32> = -55.0..=125.0;

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureSample {
    pub celsius: f32,
    pub at: NaiveDateTime,
}

// ── History ──────────────────────────────────────────────────

type SharedHistory = Arc<CriticalSectionMutex<RefCell<HistoryBuffer<TemperatureSample, HISTORY_CAPACITY>>>>;

/// Cloneable read-only view of the sample history.
#[derive(Clone)]
pub struct TemperatureHistory {
    inner: SharedHistory,
}

impl TemperatureHistory {
    fn new() -> Self {
        Self {
            inner: Arc::new(CriticalSectionMutex::new(RefCell::new(HistoryBuffer::new()))),
        }
    }

    fn record(&self, sample: TemperatureSample) {
        self.inner.lock(|h| h.borrow_mut().write(sample));
    }

    pub fn latest(&self) -> Option<TemperatureSample> {
        self.inner.lock(|h| h.borrow().recent().copied())
    }

    /// All retained samples, oldest first.
    pub fn samples(&self) -> Vec<TemperatureSample> {
        self.inner
            .lock(|h| h.borrow().oldest_ordered().copied().collect())
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|h| h.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Probe worker ─────────────────────────────────────────────

enum ProbeRequest {
    Read(u32),
    Stop,
}

type ProbeReply = (u32, Result<f32, SensorError>);

type Requests = Arc<Channel<CriticalSectionRawMutex, ProbeRequest, 1>>;
type Replies = Arc<Channel<CriticalSectionRawMutex, ProbeReply, 2>>;

fn probe_loop(mut probe: impl TemperatureProbe, requests: &Requests, replies: &Replies) {
    futures_lite::future::block_on(async {
        loop {
            match requests.receive().await {
                ProbeRequest::Read(seq) => {
                    let reading = probe.read_celsius();
                    replies.send((seq, reading)).await;
                }
                ProbeRequest::Stop => break,
            }
        }
    });
    info!("probe worker stopped");
}

// ── Thermometer ──────────────────────────────────────────────

pub struct Thermometer {
    requests: Requests,
    replies: Replies,
    next_seq: core::cell::Cell<u32>,
    history: TemperatureHistory,
    read_timeout: Duration,
    _worker: JoinHandle<()>,
}

impl Thermometer {
    /// Move `probe` onto its own thread.
    pub fn spawn(probe: impl TemperatureProbe) -> io::Result<Self> {
        let requests: Requests = Arc::new(Channel::new());
        let replies: Replies = Arc::new(Channel::new());
        let worker = {
            let requests = requests.clone();
            let replies = replies.clone();
            spawn_worker("probe", 32, move || probe_loop(probe, &requests, &replies))?
        };
        Ok(Self {
            requests,
            replies,
            next_seq: core::cell::Cell::new(0),
            history: TemperatureHistory::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            _worker: worker,
        })
    }

    /// Give up on a read after `timeout` (default 2 s).
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn history(&self) -> TemperatureHistory {
        self.history.clone()
    }

    async fn exchange(&self, seq: u32) -> Result<f32, SensorError> {
        self.requests.send(ProbeRequest::Read(seq)).await;
        loop {
            let (reply_seq, reading) = self.replies.receive().await;
            if reply_seq == seq {
                return reading;
            }
            debug!("probe: discarding stale reply #{}", reply_seq);
        }
    }
}

impl TemperatureSource for Thermometer {
    async fn read_temperature(&self) -> Result<f32, SensorError> {
        let seq = self.next_seq.get().wrapping_add(1);
        self.next_seq.set(seq);

        let timeout = async {
            async_io_mini::Timer::after(self.read_timeout).await;
            Err(SensorError::Timeout)
        };
        let celsius = futures_lite::future::or(self.exchange(seq), timeout).await?;

        if !celsius.is_finite() || !VALID_RANGE_C.contains(&celsius) {
            return Err(SensorError::OutOfRange(celsius));
        }
        self.history.record(TemperatureSample {
            celsius,
            at: Local::now().naive_local(),
        });
        Ok(celsius)
    }

    fn last_temperature(&self) -> Option<f32> {
        self.history.latest().map(|s| s.celsius)
    }
}

impl Drop for Thermometer {
    fn drop(&mut self) {
        // Best effort: a worker stuck in a read exits with the process.
        let _ = self.requests.try_send(ProbeRequest::Stop);
    }
}
