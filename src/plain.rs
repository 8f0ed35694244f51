//! Line-oriented output for `--plain` mode: one summary line per snapshot
//! followed by one line per core.

use std::io::{self, Write};

use crate::sink::DisplaySink;
use crate::system::{CoreReading, Snapshot};

pub struct PlainSink<W: Write, E: Write> {
    out: W,
    err: E,
    rendered: usize,
    /// First write error on `out`; nothing more is written after it
    failure: Option<io::Error>,
}

impl PlainSink<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<W: Write, E: Write> PlainSink<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err, rendered: 0, failure: None }
    }

    /// Snapshots written so far
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    /// The error that stopped output, e.g. a closed pipe
    pub fn take_failure(&mut self) -> Option<io::Error> {
        self.failure.take()
    }

    pub fn into_inner(self) -> (W, E) {
        (self.out, self.err)
    }

    fn write_snapshot(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let topology = snapshot.topology();
        let freq = snapshot
            .current_frequency_mhz()
            .map(|mhz| format!("{mhz:.1} MHz"))
            .unwrap_or_else(|| "unknown".to_string());
        let nominal = topology
            .nominal_clock_mhz
            .map(|mhz| format!("{mhz:.0} MHz"))
            .unwrap_or_else(|| "unknown".to_string());

        writeln!(
            self.out,
            "#{} {} | {} | {}P/{}L | freq {} | nominal {} | avg {:.1}%",
            snapshot.sequence(),
            snapshot.timestamp().format("%H:%M:%S"),
            topology.display_name(),
            topology.physical_core_count,
            topology.logical_core_count,
            freq,
            nominal,
            snapshot.average_utilization(),
        )?;
        for reading in snapshot.physical_readings() {
            writeln!(self.out, "  {}", format_reading("core", reading))?;
        }
        for reading in snapshot.logical_readings() {
            writeln!(self.out, "  {}", format_reading("logical", reading))?;
        }
        self.out.flush()
    }
}

fn format_reading(kind: &str, reading: &CoreReading) -> String {
    let temp = match reading.temperature {
        Some(t) => format!(
            "{}{:.1}C/{:.1}F",
            if t.is_fallback() { "~" } else { "" },
            t.celsius,
            t.fahrenheit()
        ),
        None => "--".to_string(),
    };
    format!("{kind} {:>3} {:>5.1}% {temp}", reading.index, reading.utilization_percent)
}

impl<W: Write, E: Write> DisplaySink for PlainSink<W, E> {
    fn render(&mut self, snapshot: Snapshot) {
        if self.failure.is_some() {
            return;
        }
        match self.write_snapshot(&snapshot) {
            Ok(()) => self.rendered += 1,
            Err(e) => {
                tracing::warn!("Failed to write snapshot: {e}");
                self.failure = Some(e);
            }
        }
    }

    fn render_degraded(&mut self, reason: &str) {
        if let Err(e) = writeln!(self.err, "coremon: stale: {reason}") {
            tracing::warn!("Failed to write degraded notice: {e}");
        }
    }
}
