use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Service configuration loaded from environment variables.
/// Every key has a default, so a bare environment starts a working service.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Delay before a scheduled pagination pass starts. Rapid input changes inside this
    /// window supersede each other and only the last one is measured.
    pub pagination_idle_ms: u64,
    /// Length of one layout/paint cycle for the measurement container.
    pub frame_interval_ms: u64,
    /// Height reserved below the printable area for measurement slack.
    pub measure_safe_offset: f32,
    /// Resolution multiplier applied when rasterizing page surfaces.
    pub export_scale: f32,
    /// TTF used to draw glyphs in exported images. Without it, text is greeked.
    pub font_path: Option<PathBuf>,
    /// When set, exported files are also written here.
    pub export_dir: Option<PathBuf>,
    /// Sessions untouched for this long are closed. Zero keeps them until deleted.
    pub session_idle_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            pagination_idle_ms: 300,
            frame_interval_ms: 16,
            measure_safe_offset: crate::layout::geometry::DEFAULT_SAFE_OFFSET,
            export_scale: crate::render::raster::DEFAULT_SCALE,
            font_path: None,
            export_dir: None,
            session_idle_secs: 1800,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            pagination_idle_ms: parse_env("PAGINATION_IDLE_MS", defaults.pagination_idle_ms)?,
            frame_interval_ms: parse_env("FRAME_INTERVAL_MS", defaults.frame_interval_ms)?,
            measure_safe_offset: parse_env("MEASURE_SAFE_OFFSET", defaults.measure_safe_offset)?,
            export_scale: parse_env("EXPORT_SCALE", defaults.export_scale)?,
            font_path: optional_path("FOLIO_FONT_PATH"),
            export_dir: optional_path("EXPORT_DIR"),
            session_idle_secs: parse_env("SESSION_IDLE_SECS", defaults.session_idle_secs)?,
        })
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.pagination_idle_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}
