mod chain_reader;
mod error;
mod sync_logs;
mod windows;

pub use chain_reader::{connect as connect_chain_reader, fetch_block_timestamp, ChainReader};
pub use error::SyncError;
pub use sync_logs::{LogOutcome, LogSyncer, SyncSummary};
pub use windows::Window;

use std::sync::Arc;
use std::time::Duration;

use ethers::types::{Address, Filter, TxHash};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::abis::AbiRegistry;
use crate::checkpoints::{CheckpointError, CheckpointStore};
use crate::handlers::Handlers;
use crate::repos::Repo;
use crate::{Config, Contract, Source};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The chain has not moved past the next block to sync
    Idle { start: u64, current: u64 },
    Synced { window: Window, summary: SyncSummary },
}

/// Polls one source and syncs its logs window by window.
///
/// The checkpoint only advances once every log of a window went through
/// `LogSyncer`, so a failed or timed out tick leaves it untouched and the
/// window is retried on the next tick.
pub struct SyncTask<R, C, K> {
    contract_name: String,
    address: Address,
    created_tx_hash: TxHash,
    repo: R,
    chain_reader: Arc<C>,
    checkpoints: Arc<K>,
    log_syncer: LogSyncer<C>,
    blocks_per_window: u64,
    poll_interval: Duration,
    tick_timeout_ms: u64,
}

impl<R, C, K> SyncTask<R, C, K>
where
    R: Repo,
    C: ChainReader + 'static,
    K: CheckpointStore + 'static,
{
    pub fn new(
        contract: &Contract,
        repo: R,
        chain_reader: Arc<C>,
        checkpoints: Arc<K>,
        config: &Config,
    ) -> Result<Self, SyncError> {
        let source = contract.source.clone();

        let address = source.address().ok_or_else(|| {
            SyncError::InvalidContract(format!(
                "{}: invalid address {}",
                contract.name, source.contract_address
            ))
        })?;
        let created_tx_hash = contract.created_tx_hash.parse::<TxHash>().map_err(|_| {
            SyncError::InvalidContract(format!(
                "{}: invalid creation transaction hash {}",
                contract.name, contract.created_tx_hash
            ))
        })?;

        let abi_registry = AbiRegistry::parse(&contract.abi)?;
        let handlers = Handlers::new(&contract.handlers, &abi_registry);

        info!(
            contract = %contract.name,
            source = %source,
            events = abi_registry.len(),
            handlers = handlers.len(),
            "sync task created"
        );

        Ok(Self {
            contract_name: contract.name.clone(),
            address,
            created_tx_hash,
            repo,
            chain_reader: chain_reader.clone(),
            checkpoints,
            log_syncer: LogSyncer {
                source,
                abi_registry: Arc::new(abi_registry),
                handlers: Arc::new(handlers),
                chain_reader,
                idempotency_key: config.idempotency_key,
            },
            blocks_per_window: config.blocks_per_window,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            tick_timeout_ms: config.tick_timeout_ms,
        })
    }

    pub fn source(&self) -> &Source {
        &self.log_syncer.source
    }

    /// Ticks until `cancellation_token` is cancelled.
    ///
    /// Cancellation is observed between ticks, an in-flight tick always runs
    /// to completion or to its timeout.
    pub async fn run(self, cancellation_token: CancellationToken) {
        info!(contract = %self.contract_name, source = %self.source(), "sync task started");

        loop {
            if cancellation_token.is_cancelled() {
                break;
            }

            match self.tick().await {
                Ok(TickOutcome::Idle { start, current }) => {
                    debug!(source = %self.source(), start, current, "nothing to sync")
                }
                Ok(TickOutcome::Synced { window, summary }) => info!(
                    source = %self.source(),
                    start = window.start,
                    end = window.end,
                    synced = summary.synced,
                    already_synced = summary.already_synced,
                    unrecognized = summary.unrecognized,
                    failed = summary.failed,
                    "window synced"
                ),
                Err(sync_error) => {
                    warn!(source = %self.source(), error = %sync_error, "tick abandoned")
                }
            }

            tokio::select! {
                _ = cancellation_token.cancelled() => break,
                _ = sleep(self.poll_interval) => {}
            }
        }

        info!(contract = %self.contract_name, source = %self.source(), "sync task stopped");
    }

    pub async fn tick(&self) -> Result<TickOutcome, SyncError> {
        timeout(
            Duration::from_millis(self.tick_timeout_ms),
            self.sync_next_window(),
        )
        .await
        .unwrap_or(Err(SyncError::Timeout(self.tick_timeout_ms)))
    }

    async fn sync_next_window(&self) -> Result<TickOutcome, SyncError> {
        let start = self.next_block_to_sync().await?;
        let current = self.chain_reader.get_block_number().await?.as_u64();

        let Some(window) = Window::compute(start, current, self.blocks_per_window) else {
            return Ok(TickOutcome::Idle { start, current });
        };

        info!(
            source = %self.source(),
            start = window.start,
            end = window.end,
            current,
            "syncing window"
        );

        let filter = Filter::new()
            .address(self.address)
            .from_block(window.start)
            .to_block(window.end);
        let logs = self.chain_reader.get_logs(&filter).await?;

        let summary = self.log_syncer.sync_all(&self.repo, &logs).await;

        self.checkpoints.set_height(self.source(), window.end).await?;

        Ok(TickOutcome::Synced { window, summary })
    }

    async fn next_block_to_sync(&self) -> Result<u64, SyncError> {
        if let Some(height) = self.checkpoints.get_height(self.source()).await? {
            return height.checked_add(1).ok_or_else(|| {
                CheckpointError::Invalid {
                    key: self.source().checkpoint_key(),
                    value: height.to_string(),
                }
                .into()
            });
        }

        let receipt = self
            .chain_reader
            .get_transaction_receipt(self.created_tx_hash)
            .await?
            .ok_or_else(|| SyncError::MissingReceipt(format!("{:#x}", self.created_tx_hash)))?;
        let created_block = receipt
            .block_number
            .ok_or_else(|| SyncError::MissingReceipt(format!("{:#x}", self.created_tx_hash)))?;

        created_block.as_u64().checked_add(1).ok_or_else(|| {
            SyncError::InvalidContract(format!(
                "{}: creation block {created_block} has no successor",
                self.contract_name
            ))
        })
    }
}
