use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use shared::domain::DEFAULT_STATUS_PATH;
use tracing::warn;

pub const SETTINGS_FILE: &str = "mudir.toml";
const APP_DIR_NAME: &str = "mudir-status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub generation_url: String,
    pub status_path: String,
    pub http_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: message_composer::DEFAULT_MODEL.into(),
            generation_url: message_composer::DEFAULT_GEMINI_URL.into(),
            status_path: DEFAULT_STATUS_PATH.into(),
            http_timeout_secs: message_composer::DEFAULT_TIMEOUT.as_secs(),
            log_filter: "info".into(),
        }
    }
}

impl AppSettings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    gemini_api_key: Option<String>,
    gemini_model: Option<String>,
    generation_url: Option<String>,
    status_path: Option<String>,
    http_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

/// `$MUDIR_CONFIG_DIR`, else the platform config dir, else `./.mudir-status`.
pub fn default_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MUDIR_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{APP_DIR_NAME}")))
}

/// Defaults, then `mudir.toml` in `config_dir`, then environment overrides.
pub fn load_settings(config_dir: &Path) -> AppSettings {
    let mut settings = AppSettings::default();

    let path = config_dir.join(SETTINGS_FILE);
    if let Ok(raw) = fs::read_to_string(&path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), "settings: ignoring unreadable file: {err}"),
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut AppSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.gemini_api_key {
        settings.gemini_api_key = Some(v);
    }
    if let Some(v) = file_cfg.gemini_model {
        settings.gemini_model = v;
    }
    if let Some(v) = file_cfg.generation_url {
        settings.generation_url = v;
    }
    if let Some(v) = file_cfg.status_path {
        settings.status_path = v;
    }
    if let Some(v) = file_cfg.http_timeout_secs.filter(|secs| *secs > 0) {
        settings.http_timeout_secs = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env(settings: &mut AppSettings, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = lookup("API_KEY") {
        settings.gemini_api_key = Some(v);
    }
    if let Some(v) = lookup("GEMINI_API_KEY") {
        settings.gemini_api_key = Some(v);
    }
    if let Some(v) = lookup("MUDIR_GEMINI_MODEL") {
        settings.gemini_model = v;
    }
    if let Some(v) = lookup("MUDIR_GENERATION_URL") {
        settings.generation_url = v;
    }
    if let Some(v) = lookup("MUDIR_STATUS_PATH") {
        settings.status_path = v;
    }
    if let Some(v) = lookup("MUDIR_HTTP_TIMEOUT_SECS") {
        // 0 counts as unset.
        if let Some(parsed) = v.trim().parse::<u64>().ok().filter(|secs| *secs > 0) {
            settings.http_timeout_secs = parsed;
        }
    }
    if let Some(v) = lookup("MUDIR_LOG") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
