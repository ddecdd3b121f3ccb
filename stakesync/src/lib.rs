pub mod abis;
pub mod checkpoints;
mod chains;
mod config;
mod contracts;
mod diesel;
pub mod events;
pub mod handlers;
mod hashes;
pub mod logging;
pub mod pools;
mod repos;
pub mod settings;
pub mod syncer;

pub use abis::AbiRegistry;
pub use chains::{ChainId, Source};
pub use checkpoints::{CheckpointError, CheckpointStore, RedisCheckpointStore};
pub use config::{Config, ConfigError, IdempotencyKey};
pub use contracts::{ChainEndpoint, Contract, ContractRecord};
pub use handlers::{EventHandler, HandlerContext, HandlerError};
pub use hashes::Hashes;
pub use repos::*;
pub use syncer::{ChainReader, SyncError, SyncTask, TickOutcome};

use std::fmt::Debug;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use ethers::types::{Address, U256};

pub type StakeSyncRepo = PostgresRepo;

pub enum StakeSyncError {
    Config(ConfigError),
    Sync(SyncError),
}

impl From<ConfigError> for StakeSyncError {
    fn from(value: ConfigError) -> Self {
        StakeSyncError::Config(value)
    }
}

impl From<SyncError> for StakeSyncError {
    fn from(value: SyncError) -> Self {
        StakeSyncError::Sync(value)
    }
}

impl Debug for StakeSyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StakeSyncError::Config(config_error) => {
                write!(f, "Config Error: {config_error:?}")
            }
            StakeSyncError::Sync(sync_error) => write!(f, "Sync Error: {sync_error:?}"),
        }
    }
}

impl std::fmt::Display for StakeSyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StakeSyncError::Config(config_error) => write!(f, "{config_error}"),
            StakeSyncError::Sync(sync_error) => write!(f, "{sync_error}"),
        }
    }
}

impl std::error::Error for StakeSyncError {}

/// Spawns one sync task per configured contract.
///
/// `chain_reader_for` resolves the chain reader of each contract. Every task
/// stops once `cancellation_token` is cancelled; await the returned handles
/// to wait for them.
pub fn start<R, C, K>(
    config: &Config,
    repo: &R,
    checkpoints: Arc<K>,
    chain_reader_for: impl Fn(&Contract) -> Result<Arc<C>, SyncError>,
    cancellation_token: &CancellationToken,
) -> Result<Vec<JoinHandle<()>>, StakeSyncError>
where
    R: Repo,
    C: ChainReader + 'static,
    K: CheckpointStore + 'static,
{
    config.validate()?;

    let tasks = config
        .contracts
        .iter()
        .map(|contract| {
            SyncTask::new(
                contract,
                repo.clone(),
                chain_reader_for(contract)?,
                checkpoints.clone(),
                config,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(tasks
        .into_iter()
        .map(|task| tokio::spawn(task.run(cancellation_token.clone())))
        .collect())
}
