use std::{fs, time::Duration};

use anyhow::Context;
use game::{ControlCatalog, GameConfig};
use serde::Deserialize;
use shared::domain::ControlSpec;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub cooldown_ms: u64,
    pub reward: u64,
    pub controls_per_device: usize,
    pub rng_seed: Option<u64>,
    pub catalog_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:8765".into(),
            cooldown_ms: 2000,
            reward: 10,
            controls_per_device: 6,
            rng_seed: None,
            catalog_path: None,
        }
    }
}

impl Settings {
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            controls_per_device: self.controls_per_device.max(1),
            reward: self.reward,
            cooldown: Duration::from_millis(self.cooldown_ms),
            rng_seed: self.rng_seed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    cooldown_ms: Option<u64>,
    reward: Option<u64>,
    controls_per_device: Option<usize>,
    rng_seed: Option<u64>,
    catalog_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    controls: Vec<ControlSpec>,
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string("server.toml").ok();
    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_from(
    raw_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.cooldown_ms {
                    settings.cooldown_ms = v;
                }
                if let Some(v) = file_cfg.reward {
                    settings.reward = v;
                }
                if let Some(v) = file_cfg.controls_per_device {
                    settings.controls_per_device = v;
                }
                if file_cfg.rng_seed.is_some() {
                    settings.rng_seed = file_cfg.rng_seed;
                }
                if file_cfg.catalog_path.is_some() {
                    settings.catalog_path = file_cfg.catalog_path;
                }
            }
            Err(error) => warn!(%error, "ignoring unreadable server.toml"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__COOLDOWN_MS").and_then(|v| v.parse().ok()) {
        settings.cooldown_ms = v;
    }
    if let Some(v) = env("APP__REWARD").and_then(|v| v.parse().ok()) {
        settings.reward = v;
    }
    if let Some(v) = env("APP__CONTROLS_PER_DEVICE").and_then(|v| v.parse().ok()) {
        settings.controls_per_device = v;
    }
    if let Some(v) = env("APP__RNG_SEED").and_then(|v| v.parse().ok()) {
        settings.rng_seed = Some(v);
    }
    if let Some(v) = env("APP__CATALOG_PATH") {
        settings.catalog_path = Some(v);
    }

    settings
}

pub fn load_catalog(path: Option<&str>) -> anyhow::Result<ControlCatalog> {
    let Some(path) = path else {
        return Ok(ControlCatalog::builtin()?);
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read control catalog '{path}'"))?;
    parse_catalog(&raw).with_context(|| format!("invalid control catalog '{path}'"))
}

pub(crate) fn parse_catalog(raw: &str) -> anyhow::Result<ControlCatalog> {
    let file: CatalogFile = toml::from_str(raw)?;
    Ok(ControlCatalog::new(file.controls)?)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
