use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::GeoPoint;

pub const DEFAULT_ROUTING_URL: &str = "http://rivag45.pythonanywhere.com";
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_MAP_CENTER: GeoPoint = GeoPoint::new(12.9716, 77.5946);
pub const DEFAULT_ZOOM: u8 = 13;
const LOCAL_SETTINGS_FILE: &str = "path_finder.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub routing_url: String,
    pub tile_url: String,
    pub map_center: GeoPoint,
    pub initial_zoom: u8,
    pub request_timeout_secs: Option<u64>,
    pub tile_fetch_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            routing_url: DEFAULT_ROUTING_URL.into(),
            tile_url: DEFAULT_TILE_URL.into(),
            map_center: DEFAULT_MAP_CENTER,
            initial_zoom: DEFAULT_ZOOM,
            request_timeout_secs: None,
            tile_fetch_concurrency: 2,
        }
    }
}

impl Settings {
    /// A timeout of zero seconds means no timeout, whichever source set it.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Defaults, then the first settings file found, then `APP__*` environment
/// variables. CLI flags are applied by the caller.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match settings_file(explicit_path) {
        Some(path) => read_settings_file(&path)?,
        None => Settings::default(),
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn settings_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(LOCAL_SETTINGS_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("path_finder").join("settings.toml"))
        .filter(|path| path.exists())
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let settings = parse_settings(&raw)
        .with_context(|| format!("invalid settings file '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "loaded settings file");
    Ok(settings)
}

fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("ROUTING_URL") {
        settings.routing_url = v;
    }
    if let Some(v) = lookup("APP__ROUTING_URL") {
        settings.routing_url = v;
    }

    if let Some(v) = lookup("APP__TILE_URL") {
        settings.tile_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(0) => settings.request_timeout_secs = None,
            Ok(parsed) => settings.request_timeout_secs = Some(parsed),
            Err(_) => tracing::warn!(value = %v, "ignoring non-numeric APP__REQUEST_TIMEOUT_SECS"),
        }
    }

    if let Some(v) = lookup("APP__INITIAL_ZOOM") {
        if let Ok(parsed) = v.parse::<u8>() {
            settings.initial_zoom = parsed;
        }
    }

    if let Some(v) = lookup("APP__TILE_FETCH_CONCURRENCY") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.tile_fetch_concurrency = parsed.max(1);
        }
    }
}
