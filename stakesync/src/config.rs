use std::fmt::Display;

use serde::Deserialize;

use crate::Contract;

/// What identifies a log as already synced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdempotencyKey {
    /// Any raw event of the transaction marks it synced, so a transaction
    /// emitting several logs for the same source only gets its first one synced
    #[default]
    TransactionHash,
    TransactionHashAndLogIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    NoContract,
    ZeroBlocksPerWindow,
    ZeroTickTimeout,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoContract => write!(f, "At least one contract is required"),
            ConfigError::ZeroBlocksPerWindow => write!(f, "blocks_per_window must be positive"),
            ConfigError::ZeroTickTimeout => write!(f, "tick_timeout_ms must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub contracts: Vec<Contract>,
    pub blocks_per_window: u64,
    pub poll_interval_ms: u64,
    pub tick_timeout_ms: u64,
    pub idempotency_key: IdempotencyKey,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            contracts: vec![],
            blocks_per_window: 10,
            poll_interval_ms: 1_000,
            tick_timeout_ms: 10_000,
            idempotency_key: IdempotencyKey::default(),
        }
    }

    pub fn add_contract(mut self, contract: Contract) -> Self {
        self.contracts.push(contract);

        self
    }

    pub fn with_blocks_per_window(mut self, blocks_per_window: u64) -> Self {
        self.blocks_per_window = blocks_per_window;

        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;

        self
    }

    pub fn with_tick_timeout_ms(mut self, tick_timeout_ms: u64) -> Self {
        self.tick_timeout_ms = tick_timeout_ms;

        self
    }

    pub fn with_idempotency_key(mut self, idempotency_key: IdempotencyKey) -> Self {
        self.idempotency_key = idempotency_key;

        self
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.contracts.is_empty() {
            Err(ConfigError::NoContract)
        } else if self.blocks_per_window == 0 {
            Err(ConfigError::ZeroBlocksPerWindow)
        } else if self.tick_timeout_ms == 0 {
            Err(ConfigError::ZeroTickTimeout)
        } else {
            Ok(())
        }
    }
}
