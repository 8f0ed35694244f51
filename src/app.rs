use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::color_scheme::{ColorScheme, ColorSchemeId};
use crate::config::CoremonConfig;
use crate::sink::DisplaySink;
use crate::system::{Snapshot, TopologyDescriptor};

/// Which view the app is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
}

/// Set while the latest sample failed; the last good snapshot stays on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Stale {
    pub reason: String,
    pub since: DateTime<Local>,
    pub failures: u32,
}

/// Terminal UI state. Owned by the UI thread only.
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,

    pub topology: Arc<TopologyDescriptor>,
    pub snapshot: Option<Snapshot>,
    pub stale: Option<Stale>,

    /// Set by input handling, consumed by the main loop
    pub refresh_requested: bool,
    pub status_message: Option<String>,

    // Core list scrolling
    pub scroll_offset: usize,
    pub visible_rows: usize,

    pub update_interval_ms: u64,
    pub color_scheme_id: ColorSchemeId,
    pub color_scheme: ColorScheme,
    /// Settings changed since startup and should be saved on exit
    pub config_dirty: bool,
}

impl App {
    pub fn new(topology: Arc<TopologyDescriptor>, config: &CoremonConfig) -> Self {
        Self {
            mode: AppMode::Normal,
            should_quit: false,
            topology,
            snapshot: None,
            stale: None,
            refresh_requested: false,
            status_message: None,
            scroll_offset: 0,
            visible_rows: 0,
            update_interval_ms: config.update_interval_ms,
            color_scheme_id: config.color_scheme_id,
            color_scheme: ColorScheme::from_id(config.color_scheme_id),
            config_dirty: false,
        }
    }

    /// Rows in the scrollable core list: two section titles, one blank
    /// separator and one row per core.
    pub fn core_list_rows(&self) -> usize {
        self.topology.physical_core_count + self.topology.logical_core_count + 3
    }

    fn max_scroll(&self) -> usize {
        self.core_list_rows().saturating_sub(self.visible_rows.max(1))
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = (self.scroll_offset + 1).min(self.max_scroll());
    }

    pub fn page_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(self.visible_rows.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_offset = (self.scroll_offset + self.visible_rows.max(1)).min(self.max_scroll());
    }

    pub fn scroll_home(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_end(&mut self) {
        self.scroll_offset = self.max_scroll();
    }

    /// Re-clamp after a resize
    pub fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
    }

    pub fn cycle_color_scheme(&mut self) {
        self.color_scheme_id = self.color_scheme_id.next();
        self.color_scheme = ColorScheme::from_id(self.color_scheme_id);
        self.config_dirty = true;
        self.status_message = Some(format!("Color scheme: {}", self.color_scheme_id.name()));
    }

    pub fn request_refresh(&mut self) {
        self.refresh_requested = true;
    }

    /// Copy UI-owned settings back into a config for saving
    pub fn store_into(&self, config: &mut CoremonConfig) {
        config.color_scheme_id = self.color_scheme_id;
    }
}

impl DisplaySink for App {
    fn render(&mut self, snapshot: Snapshot) {
        self.snapshot = Some(snapshot);
        self.stale = None;
    }

    fn render_degraded(&mut self, reason: &str) {
        match self.stale.as_mut() {
            Some(stale) => {
                stale.reason = reason.to_string();
                stale.failures += 1;
            }
            None => {
                self.stale = Some(Stale {
                    reason: reason.to_string(),
                    since: Local::now(),
                    failures: 1,
                });
            }
        }
    }
}
