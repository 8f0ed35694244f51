//! coremon configuration persistence (htoprc-style key=value format)
//!
//! Lives at `coremon/coremonrc` under the platform config directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::color_scheme::ColorSchemeId;
use crate::scheduler::SchedulerOptions;
use crate::system::FallbackPolicy;

pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_SAMPLE_TIMEOUT_MS: u64 = 1000;

const INTERVAL_RANGE_MS: (u64, u64) = (250, 60_000);
const TIMEOUT_RANGE_MS: (u64, u64) = (50, 30_000);

/// Default config file path for this platform
pub fn config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("APPDATA").map(PathBuf::from))
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("coremon").join("coremonrc"))
}

/// Persistable settings
#[derive(Debug, Clone, PartialEq)]
pub struct CoremonConfig {
    pub update_interval_ms: u64,
    pub sample_timeout_ms: u64,
    /// Synthesize temperatures when no sensor value exists
    pub simulated_temperatures: bool,
    pub fallback_seed: Option<u64>,
    pub color_scheme_id: ColorSchemeId,
    pub log_file: Option<PathBuf>,
}

impl Default for CoremonConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            sample_timeout_ms: DEFAULT_SAMPLE_TIMEOUT_MS,
            simulated_temperatures: true,
            fallback_seed: None,
            color_scheme_id: ColorSchemeId::Default,
            log_file: None,
        }
    }
}

impl CoremonConfig {
    /// Load from the default path, returning defaults if the file doesn't exist
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Unknown keys and unparseable values are ignored
    pub fn parse(content: &str) -> Self {
        let mut cfg = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "update_interval_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.update_interval_ms = v.clamp(INTERVAL_RANGE_MS.0, INTERVAL_RANGE_MS.1);
                    }
                }
                "sample_timeout_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.sample_timeout_ms = v.clamp(TIMEOUT_RANGE_MS.0, TIMEOUT_RANGE_MS.1);
                    }
                }
                "temperature_fallback" => match value {
                    "simulated" => cfg.simulated_temperatures = true,
                    "absent" => cfg.simulated_temperatures = false,
                    _ => {}
                },
                "fallback_seed" => cfg.fallback_seed = value.parse::<u64>().ok(),
                "color_scheme" => {
                    if let Ok(idx) = value.parse::<usize>() {
                        cfg.color_scheme_id = ColorSchemeId::from_index(idx);
                    }
                }
                "log_file" => {
                    cfg.log_file = if value.is_empty() { None } else { Some(PathBuf::from(value)) };
                }
                _ => {}
            }
        }

        cfg
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# coremon configuration file".to_string());
        lines.push(String::new());
        lines.push(format!("update_interval_ms={}", self.update_interval_ms));
        lines.push(format!("sample_timeout_ms={}", self.sample_timeout_ms));
        lines.push(format!(
            "temperature_fallback={}",
            if self.simulated_temperatures { "simulated" } else { "absent" }
        ));
        if let Some(seed) = self.fallback_seed {
            lines.push(format!("fallback_seed={seed}"));
        }
        lines.push(format!("color_scheme={}", self.color_scheme_id as usize));
        if let Some(log_file) = &self.log_file {
            lines.push(format!("log_file={}", log_file.display()));
        }
        lines.join("\n") + "\n"
    }

    /// Save to the default path
    pub fn save(&self) -> Result<()> {
        let path = config_path().context("Could not determine config path")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let mut file = fs::File::create(path)
            .with_context(|| format!("Failed to create config file {}", path.display()))?;
        file.write_all(self.render().as_bytes())
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Clamped to the supported range, like values read from the file
    pub fn set_update_interval_ms(&mut self, ms: u64) {
        self.update_interval_ms = ms.clamp(INTERVAL_RANGE_MS.0, INTERVAL_RANGE_MS.1);
    }

    pub fn set_sample_timeout_ms(&mut self, ms: u64) {
        self.sample_timeout_ms = ms.clamp(TIMEOUT_RANGE_MS.0, TIMEOUT_RANGE_MS.1);
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        if self.simulated_temperatures {
            FallbackPolicy::Simulated { seed: self.fallback_seed }
        } else {
            FallbackPolicy::Absent
        }
    }

    pub fn scheduler_options(&self) -> SchedulerOptions {
        SchedulerOptions {
            interval: Duration::from_millis(self.update_interval_ms),
            sample_timeout: Duration::from_millis(self.sample_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_known_keys_and_ignores_noise() {
        let cfg = CoremonConfig::parse(
            "# comment\n\
             update_interval_ms = 1500\n\
             sample_timeout_ms=200\n\
             temperature_fallback=absent\n\
             fallback_seed=99\n\
             color_scheme=2\n\
             mystery=1\n\
             not a pair\n",
        );
        assert_eq!(cfg.update_interval_ms, 1500);
        assert_eq!(cfg.sample_timeout_ms, 200);
        assert!(!cfg.simulated_temperatures);
        assert_eq!(cfg.fallback_seed, Some(99));
        assert_eq!(cfg.color_scheme_id, ColorSchemeId::LightTerminal);
        assert_eq!(cfg.fallback_policy(), FallbackPolicy::Absent);
    }

    #[test]
    fn interval_and_timeout_are_clamped() {
        let cfg = CoremonConfig::parse("update_interval_ms=10\nsample_timeout_ms=999999\n");
        assert_eq!(cfg.update_interval_ms, 250);
        assert_eq!(cfg.sample_timeout_ms, 30_000);

        let mut cfg = CoremonConfig::parse("update_interval_ms=abc\n");
        assert_eq!(cfg.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS);

        cfg.set_update_interval_ms(100_000);
        cfg.set_sample_timeout_ms(1);
        assert_eq!(cfg.update_interval_ms, 60_000);
        assert_eq!(cfg.sample_timeout_ms, 50);
    }

    #[test]
    fn rendered_config_parses_back() {
        let cfg = CoremonConfig {
            update_interval_ms: 750,
            sample_timeout_ms: 400,
            simulated_temperatures: true,
            fallback_seed: Some(5),
            color_scheme_id: ColorSchemeId::DarkVivid,
            log_file: Some(PathBuf::from("/tmp/coremon.log")),
        };
        assert_eq!(CoremonConfig::parse(&cfg.render()), cfg);
        assert_eq!(cfg.fallback_policy(), FallbackPolicy::Simulated { seed: Some(5) });
        assert_eq!(cfg.scheduler_options().interval, Duration::from_millis(750));
    }

    #[test]
    fn default_path_follows_xdg_config_home() {
        let dir = std::env::temp_dir().join(format!("coremon-config-{}", std::process::id()));
        std::env::set_var("XDG_CONFIG_HOME", &dir);
        assert_eq!(config_path(), Some(dir.join("coremon").join("coremonrc")));

        let cfg = CoremonConfig { color_scheme_id: ColorSchemeId::Monochrome, ..Default::default() };
        cfg.save().unwrap();
        assert_eq!(CoremonConfig::load(), cfg);

        std::env::remove_var("XDG_CONFIG_HOME");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = CoremonConfig::load_from(Path::new("/nonexistent/coremon/coremonrc"));
        assert_eq!(cfg, CoremonConfig::default());
    }
}
