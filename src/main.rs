//! coremon - per-core CPU monitor for the terminal.
//!
//! Shows utilization, clock and temperature for every physical and logical
//! core, refreshed every few seconds or on demand (F5 / r / Enter).
//!
//! Keybindings: Press F1 or '?' for help.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use crossbeam_channel::Receiver;
use ratatui::{backend::CrosstermBackend, Terminal};

use coremon::app::App;
use coremon::config::CoremonConfig;
use coremon::logging::{self, LogTarget};
use coremon::plain::PlainSink;
use coremon::sampler::Sampler;
use coremon::scheduler::RefreshScheduler;
use coremon::sink::{self, Update};
use coremon::system::{SysinfoProvider, SysinfoSensor, TopologyDescriptor};
use coremon::{input, ui};

#[derive(Parser, Debug)]
#[command(name = "coremon", version, about = "Per-core CPU monitor")]
struct Cli {
    /// Refresh interval in milliseconds
    #[arg(short, long)]
    interval: Option<u64>,

    /// Give up on a sample after this many milliseconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Seed for simulated temperatures
    #[arg(long)]
    seed: Option<u64>,

    /// Show no temperature instead of a simulated one when sensors are missing
    #[arg(long)]
    no_simulated_temps: bool,

    /// Print snapshots as text lines instead of the terminal UI
    #[arg(long)]
    plain: bool,

    /// Exit after this many snapshots (plain mode)
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Append log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Read settings from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn merge_into(&self, cfg: &mut CoremonConfig) {
        if let Some(ms) = self.interval {
            cfg.set_update_interval_ms(ms);
        }
        if let Some(ms) = self.timeout {
            cfg.set_sample_timeout_ms(ms);
        }
        if self.seed.is_some() {
            cfg.fallback_seed = self.seed;
        }
        if self.no_simulated_temps {
            cfg.simulated_temperatures = false;
        }
        if self.log_file.is_some() {
            cfg.log_file = self.log_file.clone();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.as_deref());
    cli.merge_into(&mut cfg);

    // The terminal UI owns stdout/stderr, so it only logs to a file
    let target = match (&cfg.log_file, cli.plain) {
        (Some(path), _) => LogTarget::File(path.as_path()),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Off,
    };
    logging::init(target)?;

    let provider = SysinfoProvider::new();
    let topology = match TopologyDescriptor::resolve(&provider) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without a CPU topology");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let sampler = Sampler::new(provider, cfg.fallback_policy()).with_sensor(SysinfoSensor::new());

    let (channel_sink, rx) = sink::channel();
    let mut scheduler = RefreshScheduler::start(
        sampler,
        Arc::clone(&topology),
        Box::new(channel_sink),
        cfg.scheduler_options(),
    )
    .context("Failed to start refresh scheduler")?;

    if cli.plain {
        let result = run_plain(&rx, cli.count);
        scheduler.stop();
        return result;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(topology, &cfg);
    let result = run_app(&mut terminal, &mut app, &scheduler, &rx);
    scheduler.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.config_dirty {
        // Only UI-owned settings are written back; command line overrides stay transient
        let mut saved = load_config(cli.config.as_deref());
        app.store_into(&mut saved);
        let saved_result = match cli.config.as_deref() {
            Some(path) => saved.save_to(path),
            None => saved.save(),
        };
        if let Err(e) = saved_result {
            tracing::warn!(error = %e, "Failed to save config");
        }
    }

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// `--config` file if given, otherwise the default location
fn load_config(path: Option<&Path>) -> CoremonConfig {
    match path {
        Some(path) => CoremonConfig::load_from(path),
        None => CoremonConfig::load(),
    }
}

/// Main application loop
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    scheduler: &RefreshScheduler,
    rx: &Receiver<Update>,
) -> Result<()> {
    loop {
        // Update visible rows based on terminal size
        let size = terminal.size()?;
        app.visible_rows = ui::core_list_height(size.height).max(1);
        app.clamp_scroll();

        if sink::drain_into(rx, app).is_none() {
            anyhow::bail!("Refresh scheduler stopped unexpectedly");
        }

        // Draw
        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        // Handle events with short timeout for responsiveness
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    // On Windows, crossterm fires Press and Release; only handle Press
                    if key.kind == KeyEventKind::Press {
                        app.status_message = None;
                        input::handle_input(app, key);
                        if app.should_quit {
                            return Ok(());
                        }
                    }
                }
                Event::Resize(_, _) => {
                    // Terminal resize - will be handled on next draw
                }
                _ => {}
            }
        }

        if std::mem::take(&mut app.refresh_requested) && !scheduler.trigger_manual_refresh() {
            app.status_message = Some("Refresh already in progress".to_string());
        }
    }
}

/// Print updates as they arrive until `count` snapshots were written
fn run_plain(rx: &Receiver<Update>, count: Option<usize>) -> Result<()> {
    let mut out = PlainSink::stdio();
    while count.map_or(true, |n| out.rendered() < n) {
        let update = rx.recv().context("Refresh scheduler stopped unexpectedly")?;
        update.apply_to(&mut out);
        if let Some(e) = out.take_failure() {
            return Err(e).context("Failed to write to stdout");
        }
    }
    Ok(())
}
