use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;

use coremon::sampler::Sampler;
use coremon::scheduler::{RefreshScheduler, SchedulerOptions, SchedulerState, MIN_INTERVAL};
use coremon::sink::{self, Update};
use coremon::system::fake::{FakeMetricsProvider, FakeSample};
use coremon::system::{FallbackPolicy, TopologyDescriptor};

const LONG: Duration = Duration::from_secs(3600);
const WAIT: Duration = Duration::from_secs(5);

fn start(provider: FakeMetricsProvider, options: SchedulerOptions) -> (RefreshScheduler, Receiver<Update>) {
    let topology = Arc::new(TopologyDescriptor::resolve(&provider).unwrap());
    let sampler = Sampler::new(provider, FallbackPolicy::Simulated { seed: Some(42) });
    let (sink, rx) = sink::channel();
    let scheduler = RefreshScheduler::start(sampler, topology, Box::new(sink), options).unwrap();
    (scheduler, rx)
}

fn next_snapshot_sequence(rx: &Receiver<Update>) -> u64 {
    match rx.recv_timeout(WAIT).unwrap() {
        Update::Snapshot(s) => s.sequence(),
        Update::Degraded { reason, .. } => panic!("unexpected degraded update: {reason}"),
    }
}

#[test]
fn periodic_snapshots_arrive_in_order() {
    let (_scheduler, rx) = start(
        FakeMetricsProvider::new(2, 4),
        SchedulerOptions { interval: MIN_INTERVAL, ..Default::default() },
    );

    let mut last = None;
    for expected in 0..4 {
        let update = rx.recv_timeout(WAIT).unwrap();
        let Update::Snapshot(snapshot) = update else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.sequence(), expected);
        if let Some(prev) = last {
            assert!(snapshot.timestamp() >= prev);
        }
        last = Some(snapshot.timestamp());
    }
}

#[test]
fn failed_sample_is_isolated_and_next_tick_recovers() {
    let provider = FakeMetricsProvider::new(1, 2).with_script(vec![
        FakeSample::ok(vec![5.0, 6.0]),
        FakeSample::err("counter read failed"),
    ]);
    let (scheduler, rx) = start(provider, SchedulerOptions { interval: MIN_INTERVAL, ..Default::default() });

    assert_eq!(next_snapshot_sequence(&rx), 0);
    match rx.recv_timeout(WAIT).unwrap() {
        Update::Degraded { reason, .. } => assert!(reason.contains("counter read failed"), "{reason}"),
        Update::Snapshot(_) => panic!("expected a degraded update"),
    }
    // Failures do not consume a sequence number
    assert_eq!(next_snapshot_sequence(&rx), 1);

    let stats = scheduler.stats();
    assert_eq!(stats.failed, 1);
    assert!(stats.delivered >= 2);
}

#[test]
fn stalled_provider_is_not_queued_behind() {
    let provider = FakeMetricsProvider::new(1, 1)
        .with_script(vec![FakeSample::ok(vec![50.0]).with_delay(Duration::from_millis(1000))]);
    let calls = provider.call_counter();
    let (mut scheduler, rx) = start(
        provider,
        SchedulerOptions { interval: MIN_INTERVAL, sample_timeout: Duration::from_millis(100) },
    );

    // Ticks keep failing fast while the first call is stuck, then sampling resumes
    let mut snapshots = Vec::new();
    let mut timeouts = 0;
    let mut busy = 0;
    while snapshots.len() < 3 {
        match rx.recv_timeout(WAIT).unwrap() {
            Update::Snapshot(s) => snapshots.push(s.sequence()),
            Update::Degraded { reason, .. } if reason.contains("timed out") => timeouts += 1,
            Update::Degraded { reason, .. } if reason.contains("still running") => busy += 1,
            Update::Degraded { reason, .. } => panic!("unexpected failure: {reason}"),
        }
    }
    scheduler.stop();
    for update in rx.try_iter() {
        match update {
            Update::Snapshot(s) => snapshots.push(s.sequence()),
            Update::Degraded { reason, .. } if reason.contains("timed out") => timeouts += 1,
            Update::Degraded { .. } => busy += 1,
        }
    }

    assert_eq!(timeouts, 1);
    assert!(busy >= 2, "expected ticks during the stall to fail fast, got {busy}");
    // Busy ticks never reach the provider; the stalled call is the only wasted one
    assert_eq!(calls.load(Ordering::SeqCst), snapshots.len() + timeouts);
    let expected: Vec<u64> = (0..snapshots.len() as u64).collect();
    assert_eq!(snapshots, expected);

    let stats = scheduler.stats();
    assert_eq!(stats.delivered as usize, snapshots.len());
    assert_eq!(stats.failed as usize, timeouts + busy);
}

#[test]
fn manual_refresh_during_stall_fails_without_calling_provider() {
    let provider = FakeMetricsProvider::new(1, 1)
        .with_script(vec![FakeSample::ok(vec![50.0]).with_delay(Duration::from_millis(800))]);
    let calls = provider.call_counter();
    let (scheduler, rx) = start(
        provider,
        SchedulerOptions { interval: LONG, sample_timeout: Duration::from_millis(100) },
    );

    match rx.recv_timeout(WAIT).unwrap() {
        Update::Degraded { reason, .. } => assert!(reason.contains("timed out"), "{reason}"),
        Update::Snapshot(_) => panic!("expected a timeout"),
    }
    assert!(scheduler.wait_for(SchedulerState::Idle, WAIT));

    assert!(scheduler.trigger_manual_refresh());
    match rx.recv_timeout(WAIT).unwrap() {
        Update::Degraded { reason, .. } => assert!(reason.contains("still running"), "{reason}"),
        Update::Snapshot(_) => panic!("sampler should still be busy"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.stats().failed, 2);
}

#[test]
fn manual_refresh_when_idle_delivers_extra_snapshot() {
    let (scheduler, rx) = start(FakeMetricsProvider::new(2, 2), SchedulerOptions { interval: LONG, ..Default::default() });

    assert_eq!(next_snapshot_sequence(&rx), 0);
    assert!(scheduler.wait_for(SchedulerState::Idle, WAIT));
    assert!(scheduler.trigger_manual_refresh());
    assert_eq!(next_snapshot_sequence(&rx), 1);
}

#[test]
fn rapid_manual_triggers_coalesce_into_one_sample() {
    let provider = FakeMetricsProvider::new(1, 1).with_script(vec![
        FakeSample::ok(vec![1.0]),
        FakeSample::ok(vec![2.0]).with_delay(Duration::from_millis(300)),
    ]);
    let calls = provider.call_counter();
    let (scheduler, rx) = start(provider, SchedulerOptions { interval: LONG, ..Default::default() });

    assert_eq!(next_snapshot_sequence(&rx), 0);
    assert!(scheduler.wait_for(SchedulerState::Idle, WAIT));

    assert!(scheduler.trigger_manual_refresh());
    for _ in 0..5 {
        assert!(!scheduler.trigger_manual_refresh());
    }
    assert_eq!(next_snapshot_sequence(&rx), 1);
    assert!(scheduler.wait_for(SchedulerState::Idle, WAIT));
    assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn stop_lets_in_flight_sample_deliver() {
    let provider = FakeMetricsProvider::new(1, 1)
        .with_script(vec![FakeSample::ok(vec![9.0]).with_delay(Duration::from_millis(300))]);
    let (mut scheduler, rx) = start(provider, SchedulerOptions { interval: MIN_INTERVAL, ..Default::default() });

    assert!(scheduler.wait_for(SchedulerState::Sampling, WAIT));
    scheduler.stop();
    assert_eq!(scheduler.state(), SchedulerState::Stopped);

    assert!(matches!(rx.try_recv(), Ok(Update::Snapshot(ref s)) if s.sequence() == 0));
    // No ticks after stop, and the sink has been dropped with the worker
    assert!(rx.recv_timeout(Duration::from_millis(600)).is_err());
}
