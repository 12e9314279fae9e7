use std::path::Path;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::info;

/// Name of the environment variable that overrides `pod.access_token`.
pub(crate) const ACCESS_TOKEN_ENV: &str = "SOLID_ACCESS_TOKEN";

#[derive(Clone, Default, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) server: ServerConfig,
    pub(crate) pod: PodConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ServerConfig {
    pub(crate) bind_address: String,
    pub(crate) http_port: u16,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct PodConfig {
    /// Bearer token presented to the pod; obtaining it is up to the operator.
    pub(crate) access_token: Option<SecretString>,
    pub(crate) timeout_secs: u64,
    pub(crate) user_agent: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            http_port: 8080,
        }
    }
}

impl Default for PodConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            timeout_secs: 10,
            user_agent: None,
        }
    }
}

impl Config {
    /// Reads the TOML file at `path`, or starts from defaults without one.
    pub(crate) fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("unable to read config {}", path.display()))?;
                let config = Config::parse(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?;
                info!(target: "config", path = %path.display(), "loaded config");
                config
            }
            None => Config::default(),
        };
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            config.pod.access_token = Some(SecretString::from(token));
        }
        Ok(config)
    }

    fn parse(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }
}
