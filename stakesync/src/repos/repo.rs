use derive_more::Display;
use std::fmt::Debug;

use futures_core::future::BoxFuture;

use crate::events::{RawEvent, UnsavedRawEvent};
use crate::pools::{Pool, UnsavedPool};
use crate::{Contract, Source, SyncError};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum RepoError {
    #[display("repo not connected: {_0}")]
    NotConnected(String),
    #[display("{_0}")]
    Unknown(String),
}

impl std::error::Error for RepoError {}

/// Operations available inside a repo transaction.
///
/// Every write of a synced log goes through the same `RepoTxn` so that the
/// raw event and whatever its handler decodes commit or roll back together.
#[async_trait::async_trait]
pub trait RepoTxn: Send {
    /// Whether `source` already recorded a raw event for `transaction_hash`,
    /// narrowed to `log_index` when given
    async fn raw_event_exists(
        &mut self,
        source: &Source,
        transaction_hash: &str,
        log_index: Option<i32>,
    ) -> Result<bool, RepoError>;
    async fn create_raw_event(&mut self, raw_event: &UnsavedRawEvent) -> Result<(), RepoError>;
    async fn get_raw_events(&mut self, source: &Source) -> Result<Vec<RawEvent>, RepoError>;

    async fn pool_exists_by_created_tx(&mut self, created_tx: &str) -> Result<bool, RepoError>;
    async fn count_pools(&mut self, contract_address: &str) -> Result<i64, RepoError>;
    async fn create_pool(&mut self, pool: &UnsavedPool) -> Result<(), RepoError>;
    async fn get_pools(&mut self, contract_address: &str) -> Result<Vec<Pool>, RepoError>;
}

#[async_trait::async_trait]
pub trait Repo: Sync + Send + Clone + Debug + 'static {
    async fn migrate(&self, migrations: &[&str]) -> Result<(), RepoError>;

    /// Loads the contract registry, joined to the endpoint of each contract's chain
    async fn get_all_contracts(&self) -> Result<Vec<Contract>, RepoError>;

    /// Runs `repo_ops` in a transaction, committing on `Ok` and rolling back on `Err`
    async fn run_in_transaction<T, F>(&self, repo_ops: F) -> Result<T, SyncError>
    where
        T: Send + 'static,
        F: for<'t> FnOnce(&'t mut dyn RepoTxn) -> BoxFuture<'t, Result<T, SyncError>>
            + Send
            + 'static;
}

pub trait RepoMigrations {
    fn create_contract_events_migration() -> &'static [&'static str];
    fn create_pool_info_migration() -> &'static [&'static str];
    fn create_chain_contracts_migration() -> &'static [&'static str];
    fn create_chain_endpoints_migration() -> &'static [&'static str];

    fn get_internal_migrations() -> Vec<&'static str> {
        [
            Self::create_contract_events_migration(),
            Self::create_pool_info_migration(),
            Self::create_chain_contracts_migration(),
            Self::create_chain_endpoints_migration(),
        ]
        .concat()
    }
}

pub struct SQLikeMigrations;

impl SQLikeMigrations {
    pub fn create_contract_events() -> &'static [&'static str] {
        &[
            "CREATE TABLE IF NOT EXISTS contract_events (
                id BIGSERIAL PRIMARY KEY,
                chain_id BIGINT NOT NULL,
                contract_address VARCHAR NOT NULL,
                event_name VARCHAR NOT NULL,
                topic0 VARCHAR NOT NULL,
                topic1 VARCHAR,
                topic2 VARCHAR,
                topic3 VARCHAR,
                data TEXT NOT NULL,
                block_number BIGINT NOT NULL,
                block_timestamp BIGINT NOT NULL,
                transaction_hash VARCHAR NOT NULL,
                log_index INTEGER NOT NULL,
                inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            "CREATE UNIQUE INDEX IF NOT EXISTS contract_events_chain_contract_tx_log_index
            ON contract_events(chain_id,contract_address,transaction_hash,log_index)",
            "CREATE INDEX IF NOT EXISTS contract_events_transaction_hash
            ON contract_events(transaction_hash)",
        ]
    }

    pub fn create_pool_info() -> &'static [&'static str] {
        &[
            "CREATE TABLE IF NOT EXISTS pool_info (
                id BIGSERIAL PRIMARY KEY,
                pool_id INTEGER NOT NULL,
                contract_address VARCHAR NOT NULL,
                st_token_address VARCHAR NOT NULL,
                pool_weight DOUBLE PRECISION NOT NULL,
                last_reward_block BIGINT NOT NULL,
                min_deposit_amount DOUBLE PRECISION NOT NULL,
                unstake_locked_blocks INTEGER NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_block BIGINT NOT NULL,
                created_tx VARCHAR NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )",
            "CREATE INDEX IF NOT EXISTS pool_info_contract_address
            ON pool_info(contract_address)",
            "CREATE INDEX IF NOT EXISTS pool_info_created_tx
            ON pool_info(created_tx)",
        ]
    }

    pub fn create_chain_contracts() -> &'static [&'static str] {
        &["CREATE TABLE IF NOT EXISTS chain_contracts (
                id SERIAL PRIMARY KEY,
                chain_id BIGINT NOT NULL,
                contract_name VARCHAR NOT NULL,
                abi TEXT NOT NULL,
                contract_address VARCHAR NOT NULL,
                created_tx_hash VARCHAR NOT NULL
            )"]
    }

    pub fn create_chain_endpoints() -> &'static [&'static str] {
        &["CREATE TABLE IF NOT EXISTS chain_endpoints (
                id SERIAL PRIMARY KEY,
                chain_id BIGINT NOT NULL,
                url VARCHAR NOT NULL
            )"]
    }
}
