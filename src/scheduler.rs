//! Refresh scheduler: one periodic timeline plus a coalescing manual trigger,
//! both funneled through a single state machine.
//!
//! ```text
//! Idle --tick | manual--> Sampling --sample returns--> Delivering --delivered--> Idle
//! ```
//!
//! The first tick fires immediately on [`RefreshScheduler::start`], then every
//! interval after that. Samples run on a dedicated sampling thread so a slow
//! provider can be bounded by a timeout; the sink is only ever called from the
//! scheduler thread, one delivery at a time.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, Receiver, RecvTimeoutError, Sender};

use crate::error::{Result, SampleFailure};
use crate::sampler::Sampler;
use crate::sink::DisplaySink;
use crate::system::{Snapshot, TopologyDescriptor};

/// Shortest accepted tick interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_SAMPLE_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Sampling,
    Delivering,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Tick,
    Manual,
}

enum Command {
    Refresh,
    Stop,
}

/// Counters exposed for status lines and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub delivered: u64,
    pub failed: u64,
    pub coalesced: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    pub interval: Duration,
    pub sample_timeout: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            sample_timeout: DEFAULT_SAMPLE_TIMEOUT,
        }
    }
}

struct Guarded {
    state: SchedulerState,
    shutting_down: bool,
    stats: SchedulerStats,
}

/// State plus the transition guard shared by the caller and the worker
struct Shared {
    guarded: Mutex<Guarded>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Guarded> {
        self.guarded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The only Idle -> Sampling transition
    fn try_claim(&self) -> bool {
        let mut g = self.lock();
        if g.shutting_down || g.state != SchedulerState::Idle {
            g.stats.coalesced += 1;
            return false;
        }
        g.state = SchedulerState::Sampling;
        self.changed.notify_all();
        true
    }

    fn set_state(&self, state: SchedulerState) {
        let mut g = self.lock();
        g.state = state;
        self.changed.notify_all();
    }
}

struct SampleRequest {
    reply: Sender<Result<Snapshot>>,
}

/// Handle to a running scheduler. Dropping it stops the scheduler.
pub struct RefreshScheduler {
    shared: Arc<Shared>,
    control: Sender<Command>,
    worker: Option<JoinHandle<()>>,
    interval: Duration,
}

impl RefreshScheduler {
    /// Starts ticking every `options.interval` (raised to [`MIN_INTERVAL`]),
    /// delivering to `sink` from the scheduler thread.
    pub fn start(
        sampler: Sampler,
        topology: Arc<TopologyDescriptor>,
        sink: Box<dyn DisplaySink + Send>,
        options: SchedulerOptions,
    ) -> io::Result<Self> {
        let interval = options.interval.max(MIN_INTERVAL);
        let shared = Arc::new(Shared {
            guarded: Mutex::new(Guarded {
                state: SchedulerState::Idle,
                shutting_down: false,
                stats: SchedulerStats::default(),
            }),
            changed: Condvar::new(),
        });

        // At most one request is ever outstanding, see `Worker::request_sample`
        let (request_tx, request_rx) = crossbeam_channel::bounded::<SampleRequest>(1);
        let sampler_busy = Arc::new(AtomicBool::new(false));
        spawn_sampling_thread(sampler, topology, request_rx, Arc::clone(&sampler_busy))?;

        let (control_tx, control_rx) = crossbeam_channel::unbounded::<Command>();
        let worker = Worker {
            shared: Arc::clone(&shared),
            requests: request_tx,
            sampler_busy,
            sink,
            timeout: options.sample_timeout,
            next_sequence: 0,
        };
        let handle = thread::Builder::new()
            .name("coremon-scheduler".into())
            .spawn(move || worker.run(interval, control_rx))?;

        tracing::info!(interval_ms = interval.as_millis() as u64, "Refresh scheduler started");

        Ok(Self {
            shared,
            control: control_tx,
            worker: Some(handle),
            interval,
        })
    }

    /// Requests an out-of-band sample. Returns `false` when a sample is
    /// already in flight (the request is coalesced) or the scheduler is
    /// stopping.
    pub fn trigger_manual_refresh(&self) -> bool {
        if !self.shared.try_claim() {
            tracing::debug!("Manual refresh coalesced");
            return false;
        }
        if self.control.send(Command::Refresh).is_err() {
            self.shared.set_state(SchedulerState::Stopped);
            return false;
        }
        true
    }

    /// Cancels future ticks and waits for an in-flight sample to be delivered.
    pub fn stop(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        {
            let mut g = self.shared.lock();
            g.shutting_down = true;
        }
        let _ = self.control.send(Command::Stop);
        if handle.join().is_err() {
            tracing::error!("Scheduler thread panicked");
            self.shared.set_state(SchedulerState::Stopped);
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.lock().state
    }

    pub fn stats(&self) -> SchedulerStats {
        self.shared.lock().stats
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the scheduler reaches `state` or `timeout` passes.
    pub fn wait_for(&self, state: SchedulerState, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut g = self.shared.lock();
        while g.state != state {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            g = self
                .shared
                .changed
                .wait_timeout(g, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    shared: Arc<Shared>,
    requests: Sender<SampleRequest>,
    /// Set while the sampling thread holds a request, including one whose
    /// reply already timed out
    sampler_busy: Arc<AtomicBool>,
    sink: Box<dyn DisplaySink + Send>,
    timeout: Duration,
    /// Delivered snapshots are numbered without gaps
    next_sequence: u64,
}

impl Worker {
    fn run(mut self, interval: Duration, control: Receiver<Command>) {
        let ticker = crossbeam_channel::tick(interval);

        if self.shared.try_claim() {
            self.cycle(Trigger::Tick);
        }

        loop {
            select! {
                recv(ticker) -> _ => {
                    if self.shared.try_claim() {
                        self.cycle(Trigger::Tick);
                    } else {
                        tracing::debug!("Tick skipped, sample already in flight");
                    }
                }
                recv(control) -> cmd => match cmd {
                    // Already claimed by the caller
                    Ok(Command::Refresh) => self.cycle(Trigger::Manual),
                    Ok(Command::Stop) | Err(_) => break,
                }
            }
        }

        self.shared.set_state(SchedulerState::Stopped);
        tracing::info!("Refresh scheduler stopped");
    }

    /// Runs Sampling -> Delivering -> Idle. The caller holds the claim.
    fn cycle(&mut self, trigger: Trigger) {
        tracing::debug!(?trigger, "Sampling");
        let result = self.request_sample();

        self.shared.set_state(SchedulerState::Delivering);
        match result {
            Ok(snapshot) => {
                let snapshot = snapshot.with_sequence(self.next_sequence);
                self.next_sequence += 1;
                tracing::debug!(sequence = snapshot.sequence(), "Delivering snapshot");
                self.sink.render(snapshot);
                self.shared.lock().stats.delivered += 1;
            }
            Err(e) => {
                tracing::warn!(?trigger, error = %e, "Sample failed, display marked stale");
                self.sink.render_degraded(&e.to_string());
                self.shared.lock().stats.failed += 1;
            }
        }
        self.shared.set_state(SchedulerState::Idle);
    }

    fn request_sample(&self) -> Result<Snapshot> {
        // A stalled provider call must not collect a queue of requests behind it
        if self.sampler_busy.swap(true, Ordering::AcqRel) {
            return Err(SampleFailure::Busy.into());
        }
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        if self.requests.try_send(SampleRequest { reply: reply_tx }).is_err() {
            self.sampler_busy.store(false, Ordering::Release);
            return Err(SampleFailure::Provider(anyhow::anyhow!("sampling thread is gone")).into());
        }
        match reply_rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            // The late reply lands in a dropped channel
            Err(RecvTimeoutError::Timeout) => Err(SampleFailure::Timeout(self.timeout).into()),
            Err(RecvTimeoutError::Disconnected) => {
                Err(SampleFailure::Provider(anyhow::anyhow!("sampling thread exited mid-sample")).into())
            }
        }
    }
}

/// The sampling thread is detached: it exits once the request channel closes
/// and any blocking provider call it is stuck in has returned.
fn spawn_sampling_thread(
    mut sampler: Sampler,
    topology: Arc<TopologyDescriptor>,
    requests: Receiver<SampleRequest>,
    busy: Arc<AtomicBool>,
) -> io::Result<()> {
    thread::Builder::new()
        .name("coremon-sampler".into())
        .spawn(move || {
            for request in requests.iter() {
                let result = sampler.sample(&topology);
                // Cleared before replying so the next tick never sees a stale flag
                busy.store(false, Ordering::Release);
                if request.reply.send(result).is_err() {
                    tracing::debug!("Discarding late sample");
                }
            }
        })
        .map(|_| ())
}
