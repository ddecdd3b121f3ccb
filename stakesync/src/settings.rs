use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::IdempotencyKey;
use crate::{Config, Contract, Source};

/// Process settings, read from a YAML file
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db: DbSettings,
    pub redis: RedisSettings,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    /// Contracts synced on top of the `chain_contracts` registry
    #[serde(default)]
    pub contracts: Vec<ContractSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbSettings {
    pub dsn: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisSettings {
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub db: i64,
}

fn default_redis_port() -> u16 {
    6379
}

impl RedisSettings {
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                self.password, self.host, self.port, self.db
            )
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub blocks_per_window: u64,
    pub poll_interval_ms: u64,
    pub tick_timeout_ms: u64,
    pub idempotency_key: IdempotencyKey,
}

impl Default for SyncSettings {
    fn default() -> Self {
        let config = Config::new();

        Self {
            blocks_per_window: config.blocks_per_window,
            poll_interval_ms: config.poll_interval_ms,
            tick_timeout_ms: config.tick_timeout_ms,
            idempotency_key: config.idempotency_key,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractSettings {
    pub name: String,
    pub chain_id: u64,
    pub address: String,
    /// Inline ABI, JSON or human-readable
    pub abi: Option<String>,
    /// ABI file, relative to the settings file
    pub abi_path: Option<PathBuf>,
    pub created_tx_hash: String,
    pub json_rpc_url: String,
}

impl ContractSettings {
    fn to_contract(&self, base_dir: &Path) -> Result<Contract> {
        let abi = match (&self.abi, &self.abi_path) {
            (Some(abi), _) => abi.clone(),
            (None, Some(abi_path)) => {
                let abi_path = base_dir.join(abi_path);

                std::fs::read_to_string(&abi_path)
                    .with_context(|| format!("Failed to read ABI file {abi_path:?}"))?
            }
            (None, None) => anyhow::bail!("contract {} has neither abi nor abi_path", self.name),
        };

        Ok(Contract::new(
            &self.name,
            Source::new(self.chain_id, &self.address),
            &abi,
            &self.created_tx_hash,
        )
        .with_json_rpc_url(&self.json_rpc_url))
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;

        Self::parse(&contents).with_context(|| format!("Failed to parse config file {path:?}"))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Sync configuration without contracts
    pub fn config(&self) -> Config {
        Config::new()
            .with_blocks_per_window(self.sync.blocks_per_window)
            .with_poll_interval_ms(self.sync.poll_interval_ms)
            .with_tick_timeout_ms(self.sync.tick_timeout_ms)
            .with_idempotency_key(self.sync.idempotency_key)
    }

    /// Contracts declared in the settings file. ABI paths resolve against `base_dir`.
    pub fn contracts(&self, base_dir: &Path) -> Result<Vec<Contract>> {
        self.contracts
            .iter()
            .map(|contract| contract.to_contract(base_dir))
            .collect()
    }
}
