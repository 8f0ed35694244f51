use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::system::Snapshot;

/// Consumer of scheduler output.
///
/// The scheduler calls a sink from one thread at a time, in sample order.
pub trait DisplaySink {
    fn render(&mut self, snapshot: Snapshot);

    /// A sample failed; the sink should keep its last good snapshot and show
    /// it as stale.
    fn render_degraded(&mut self, reason: &str);
}

impl<S: DisplaySink + ?Sized> DisplaySink for Box<S> {
    fn render(&mut self, snapshot: Snapshot) {
        (**self).render(snapshot)
    }

    fn render_degraded(&mut self, reason: &str) {
        (**self).render_degraded(reason)
    }
}

/// One scheduler delivery, as carried across threads
#[derive(Debug, Clone)]
pub enum Update {
    Snapshot(Snapshot),
    Degraded { reason: String, at: DateTime<Local> },
}

impl Update {
    pub fn apply_to(self, sink: &mut dyn DisplaySink) {
        match self {
            Update::Snapshot(snapshot) => sink.render(snapshot),
            Update::Degraded { reason, .. } => sink.render_degraded(&reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Update::Degraded { .. })
    }
}

/// Forwards deliveries to another thread, typically the UI thread, which
/// drains them with [`drain_into`].
pub struct ChannelSink {
    tx: Sender<Update>,
}

/// Creates a forwarding sink and the receiving end for the UI thread.
pub fn channel() -> (ChannelSink, Receiver<Update>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ChannelSink { tx }, rx)
}

impl DisplaySink for ChannelSink {
    fn render(&mut self, snapshot: Snapshot) {
        if self.tx.send(Update::Snapshot(snapshot)).is_err() {
            tracing::debug!("Display receiver gone, dropping snapshot");
        }
    }

    fn render_degraded(&mut self, reason: &str) {
        let update = Update::Degraded { reason: reason.to_string(), at: Local::now() };
        if self.tx.send(update).is_err() {
            tracing::debug!("Display receiver gone, dropping degraded notice");
        }
    }
}

/// Applies every pending update to `sink` without blocking. Returns how many
/// were applied; `None` once the sending side is gone and nothing is left.
pub fn drain_into(rx: &Receiver<Update>, sink: &mut dyn DisplaySink) -> Option<usize> {
    let mut applied = 0;
    loop {
        match rx.try_recv() {
            Ok(update) => {
                update.apply_to(sink);
                applied += 1;
            }
            Err(TryRecvError::Empty) => return Some(applied),
            Err(TryRecvError::Disconnected) => {
                return if applied > 0 { Some(applied) } else { None };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl DisplaySink for Recorder {
        fn render(&mut self, snapshot: Snapshot) {
            self.events.push(format!("snapshot {}", snapshot.sequence()));
        }

        fn render_degraded(&mut self, reason: &str) {
            self.events.push(format!("degraded {reason}"));
        }
    }

    #[test]
    fn channel_preserves_order() {
        let (mut sink, rx) = channel();
        sink.render_degraded("first");
        sink.render_degraded("second");

        let mut recorder = Recorder::default();
        assert_eq!(drain_into(&rx, &mut recorder), Some(2));
        assert_eq!(recorder.events, vec!["degraded first", "degraded second"]);
        assert_eq!(drain_into(&rx, &mut recorder), Some(0));

        drop(sink);
        assert_eq!(drain_into(&rx, &mut recorder), None);
    }
}
