use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use dashboard_core::{DashboardHttp, Timings};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub search_debounce_ms: u64,
    pub notification_ttl_ms: u64,
    pub reload_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            request_timeout_secs: 30,
            search_debounce_ms: 300,
            notification_ttl_ms: 5000,
            reload_delay_ms: 1500,
        }
    }
}

impl Settings {
    pub fn timings(&self) -> Timings {
        Timings {
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            notification_ttl: Duration::from_millis(self.notification_ttl_ms),
            reload_delay: Duration::from_millis(self.reload_delay_ms),
        }
    }

    pub fn http(&self) -> anyhow::Result<DashboardHttp> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()
            .context("failed to build http client")?;
        DashboardHttp::with_client(client, &self.server_url)
            .with_context(|| format!("invalid server url '{}'", self.server_url))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_secs: Option<u64>,
    search_debounce_ms: Option<u64>,
    notification_ttl_ms: Option<u64>,
    reload_delay_ms: Option<u64>,
}

/// Defaults, then the TOML file, then environment variables. An explicitly
/// named file must exist; the default `dashboard.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = file_cfg.search_debounce_ms {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file_cfg.notification_ttl_ms {
        settings.notification_ttl_ms = v;
    }
    if let Some(v) = file_cfg.reload_delay_ms {
        settings.reload_delay_ms = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("DASHBOARD_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    let numeric = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
    if let Some(v) = numeric("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v;
    }
    if let Some(v) = numeric("APP__SEARCH_DEBOUNCE_MS") {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = numeric("APP__NOTIFICATION_TTL_MS") {
        settings.notification_ttl_ms = v;
    }
    if let Some(v) = numeric("APP__RELOAD_DELAY_MS") {
        settings.reload_delay_ms = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
