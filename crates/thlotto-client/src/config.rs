use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::api::ApiProvider;

pub const CONFIG_FILE: &str = "thlotto.toml";
pub const CONFIG_ENV: &str = "THLOTTO_CONFIG";

const ENV_BASE_URL: &str = "THLOTTO_BASE_URL";
const ENV_DATA_FILE: &str = "THLOTTO_DATA_FILE";
const ENV_PACING_MS: &str = "THLOTTO_PACING_MS";
const ENV_TIMEOUT_MS: &str = "THLOTTO_TIMEOUT_MS";
const ENV_END_YEAR_BE: &str = "THLOTTO_END_YEAR_BE";
const ENV_MAX_ATTEMPTS: &str = "THLOTTO_MAX_ATTEMPTS";

/// Runtime settings. Resolved as defaults, then `thlotto.toml`, then
/// `THLOTTO_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: String,
    pub data_file: PathBuf,
    pub pacing_ms: u64,
    pub timeout_ms: u64,
    pub backfill_end_year_be: i32,
    pub max_attempts: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ApiProvider::Rayriffy.default_base_url().to_owned(),
            data_file: PathBuf::from("data/lotto.json"),
            pacing_ms: 500,
            timeout_ms: 10_000,
            backfill_end_year_be: 2550,
            max_attempts: thlotto_combora::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ClientConfig {
    /// Full resolution: `.env`, the config file named by `THLOTTO_CONFIG`
    /// (or `thlotto.toml` if present), then environment overrides.
    pub fn load() -> Result<Self> {
        crate::load_env();

        let explicit = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
        let mut config = match &explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => {
                log::debug!("No {CONFIG_FILE} found, using defaults");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        log::debug!("Resolved config: {config:?}");
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from `lookup`, normally the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.base_url = v;
        }
        if let Some(v) = lookup(ENV_DATA_FILE) {
            self.data_file = PathBuf::from(v);
        }
        override_parsed(&lookup, ENV_PACING_MS, &mut self.pacing_ms)?;
        override_parsed(&lookup, ENV_TIMEOUT_MS, &mut self.timeout_ms)?;
        override_parsed(&lookup, ENV_END_YEAR_BE, &mut self.backfill_end_year_be)?;
        override_parsed(&lookup, ENV_MAX_ATTEMPTS, &mut self.max_attempts)?;
        Ok(())
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {key}: {raw:?}"))?;
    }
    Ok(())
}
