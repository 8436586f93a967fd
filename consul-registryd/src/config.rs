use std::path::Path;
use std::time::Duration;
use serde::Deserialize;
use anyhow::{Context, Result};
use mesh_model::hostname::DEFAULT_DOMAIN;
use mesh_model::{HostnameCodec, Protocol};
use crate::consul::conversion::DEFAULT_PROTOCOL_KEY;
use crate::consul::TagTranslator;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub consul: ConsulConfig,
    #[serde(default)]
    pub mesh: MeshConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsulConfig {
    pub endpoint: String,
    #[serde(default)]
    pub datacenter: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeshConfig {
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default = "default_protocol_key")]
    pub protocol_key: String,
    /// Protocol assumed for nodes that carry no protocol hint
    #[serde(default = "default_protocol")]
    pub default_protocol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_timeout() -> u64 {
    3
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_protocol_key() -> String {
    DEFAULT_PROTOCOL_KEY.to_string()
}

fn default_protocol() -> String {
    Protocol::Http.as_str().to_string()
}

fn default_listen() -> String {
    "[::]:8054".to_string()
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            protocol_key: default_protocol_key(),
            default_protocol: default_protocol(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ConsulConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl MeshConfig {
    pub fn codec(&self) -> HostnameCodec {
        HostnameCodec::new(self.domain.as_str())
    }

    pub fn translator(&self) -> Result<TagTranslator> {
        let protocol = Protocol::parse(&self.default_protocol)
            .with_context(|| format!("Unsupported default_protocol {:?}", self.default_protocol))?;
        Ok(TagTranslator::new(self.protocol_key.as_str(), protocol))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }
}
