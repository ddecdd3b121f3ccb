use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use redis::{ErrorKind, RedisError};
use stakesync::events::{RawEvent, UnsavedRawEvent};
use stakesync::pools::{Pool, UnsavedPool};
use stakesync::{
    ChainEndpoint, CheckpointError, CheckpointStore, Contract, ContractRecord, Repo, RepoError,
    RepoTxn, Source, SyncError,
};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub raw_events: Vec<RawEvent>,
    pub pools: Vec<Pool>,
}

/// Repo keeping its tables in memory. A transaction works on a copy of the
/// tables that replaces them only when the transaction succeeds.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    tables: Arc<Mutex<Tables>>,
    contract_records: Vec<ContractRecord>,
    endpoints: Vec<ChainEndpoint>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(
        contract_records: Vec<ContractRecord>,
        endpoints: Vec<ChainEndpoint>,
    ) -> Self {
        Self {
            contract_records,
            endpoints,
            ..Default::default()
        }
    }

    pub async fn raw_events(&self) -> Vec<RawEvent> {
        self.tables.lock().await.raw_events.clone()
    }

    pub async fn pools(&self) -> Vec<Pool> {
        self.tables.lock().await.pools.clone()
    }
}

#[async_trait::async_trait]
impl Repo for MemoryRepo {
    async fn migrate(&self, _migrations: &[&str]) -> Result<(), RepoError> {
        Ok(())
    }

    async fn get_all_contracts(&self) -> Result<Vec<Contract>, RepoError> {
        Ok(Contract::from_records(
            self.contract_records.clone(),
            &self.endpoints,
        ))
    }

    async fn run_in_transaction<T, F>(&self, repo_ops: F) -> Result<T, SyncError>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn RepoTxn) -> BoxFuture<'t, Result<T, SyncError>>
            + Send
            + 'static,
    {
        let mut tables = self.tables.lock().await;
        let mut txn = MemoryRepoTxn {
            tables: tables.clone(),
        };

        let result = repo_ops(&mut txn).await;

        if result.is_ok() {
            *tables = txn.tables;
        }

        result
    }
}

pub struct MemoryRepoTxn {
    tables: Tables,
}

#[async_trait::async_trait]
impl RepoTxn for MemoryRepoTxn {
    async fn raw_event_exists(
        &mut self,
        source: &Source,
        transaction_hash: &str,
        log_index: Option<i32>,
    ) -> Result<bool, RepoError> {
        Ok(self.tables.raw_events.iter().any(|raw_event| {
            raw_event.chain_id as u64 == source.chain_id
                && raw_event.contract_address == source.contract_address
                && raw_event.transaction_hash == transaction_hash
                && log_index.map_or(true, |log_index| raw_event.log_index == log_index)
        }))
    }

    async fn create_raw_event(&mut self, raw_event: &UnsavedRawEvent) -> Result<(), RepoError> {
        let raw_events = &mut self.tables.raw_events;

        let duplicate = raw_events.iter().any(|existing| {
            existing.chain_id == raw_event.chain_id
                && existing.contract_address == raw_event.contract_address
                && existing.transaction_hash == raw_event.transaction_hash
                && existing.log_index == raw_event.log_index
        });
        if duplicate {
            return Err(RepoError::Unknown(
                "duplicate key value violates unique constraint".to_string(),
            ));
        }

        let UnsavedRawEvent {
            chain_id,
            contract_address,
            event_name,
            topic0,
            topic1,
            topic2,
            topic3,
            data,
            block_number,
            block_timestamp,
            transaction_hash,
            log_index,
        } = raw_event.clone();

        raw_events.push(RawEvent {
            id: raw_events.len() as i64 + 1,
            chain_id,
            contract_address,
            event_name,
            topic0,
            topic1,
            topic2,
            topic3,
            data,
            block_number,
            block_timestamp,
            transaction_hash,
            log_index,
            inserted_at: chrono::Utc::now(),
        });

        Ok(())
    }

    async fn get_raw_events(&mut self, source: &Source) -> Result<Vec<RawEvent>, RepoError> {
        let mut raw_events: Vec<_> = self
            .tables
            .raw_events
            .iter()
            .filter(|raw_event| {
                raw_event.chain_id as u64 == source.chain_id
                    && raw_event.contract_address == source.contract_address
            })
            .cloned()
            .collect();
        raw_events.sort_by_key(|raw_event| (raw_event.block_number, raw_event.log_index));

        Ok(raw_events)
    }

    async fn pool_exists_by_created_tx(&mut self, created_tx: &str) -> Result<bool, RepoError> {
        Ok(self.tables.pools.iter().any(|pool| pool.created_tx == created_tx))
    }

    async fn count_pools(&mut self, contract_address: &str) -> Result<i64, RepoError> {
        Ok(self
            .tables
            .pools
            .iter()
            .filter(|pool| pool.contract_address == contract_address)
            .count() as i64)
    }

    async fn create_pool(&mut self, pool: &UnsavedPool) -> Result<(), RepoError> {
        let pools = &mut self.tables.pools;
        let pool = pool.clone();

        pools.push(Pool {
            id: pools.len() as i64 + 1,
            pool_id: pool.pool_id,
            contract_address: pool.contract_address,
            st_token_address: pool.st_token_address,
            pool_weight: pool.pool_weight,
            last_reward_block: pool.last_reward_block,
            min_deposit_amount: pool.min_deposit_amount,
            unstake_locked_blocks: pool.unstake_locked_blocks,
            is_active: pool.is_active,
            created_block: pool.created_block,
            created_tx: pool.created_tx,
            created_at: pool.created_at,
        });

        Ok(())
    }

    async fn get_pools(&mut self, contract_address: &str) -> Result<Vec<Pool>, RepoError> {
        let mut pools: Vec<_> = self
            .tables
            .pools
            .iter()
            .filter(|pool| pool.contract_address == contract_address)
            .cloned()
            .collect();
        pools.sort_by_key(|pool| pool.pool_id);

        Ok(pools)
    }
}

/// Checkpoint store remembering every height it was given
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    heights: Mutex<HashMap<String, u64>>,
    history: Mutex<Vec<u64>>,
    failing_set_height: AtomicBool,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_height(source: &Source, height: u64) -> Self {
        let store = Self::new();
        store.heights.lock().await.insert(source.checkpoint_key(), height);

        store
    }

    pub async fn height(&self, source: &Source) -> Option<u64> {
        self.heights.lock().await.get(&source.checkpoint_key()).copied()
    }

    /// Rewinds without recording history, as if the last write was lost
    pub async fn rewind(&self, source: &Source, height: u64) {
        self.heights.lock().await.insert(source.checkpoint_key(), height);
    }

    pub async fn history(&self) -> Vec<u64> {
        self.history.lock().await.clone()
    }

    /// Makes `set_height` fail as an unreachable store would
    pub fn fail_set_height(&self, failing: bool) {
        self.failing_set_height.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn get_height(&self, source: &Source) -> Result<Option<u64>, CheckpointError> {
        Ok(self.height(source).await)
    }

    async fn set_height(&self, source: &Source, height: u64) -> Result<(), CheckpointError> {
        if self.failing_set_height.load(Ordering::SeqCst) {
            return Err(RedisError::from((ErrorKind::IoError, "connection refused")).into());
        }

        self.heights.lock().await.insert(source.checkpoint_key(), height);
        self.history.lock().await.push(height);

        Ok(())
    }
}
