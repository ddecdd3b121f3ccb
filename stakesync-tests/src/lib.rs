pub mod db;
pub mod factory;
pub mod memory;
pub mod test_runner;

use std::sync::Arc;

use stakesync::{Config, Contract, SyncTask};

use factory::FakeChainReader;
use memory::{MemoryCheckpointStore, MemoryRepo};

pub type TestSyncTask = SyncTask<MemoryRepo, FakeChainReader, MemoryCheckpointStore>;

/// Sync task over in-memory fakes with the default config
pub fn sync_task(
    contract: &Contract,
    repo: &MemoryRepo,
    chain_reader: &Arc<FakeChainReader>,
    checkpoints: &Arc<MemoryCheckpointStore>,
) -> TestSyncTask {
    sync_task_with_config(contract, repo, chain_reader, checkpoints, &Config::new())
}

pub fn sync_task_with_config(
    contract: &Contract,
    repo: &MemoryRepo,
    chain_reader: &Arc<FakeChainReader>,
    checkpoints: &Arc<MemoryCheckpointStore>,
    config: &Config,
) -> TestSyncTask {
    SyncTask::new(
        contract,
        repo.clone(),
        chain_reader.clone(),
        checkpoints.clone(),
        config,
    )
    .unwrap()
}
