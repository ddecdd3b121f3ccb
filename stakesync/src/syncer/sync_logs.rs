use std::sync::Arc;

use ethers::types::Log;
use futures_util::FutureExt;
use tracing::{error, info};

use super::chain_reader::{self, ChainReader};
use super::SyncError;
use crate::abis::AbiRegistry;
use crate::config::IdempotencyKey;
use crate::events::{self, UnsavedRawEvent};
use crate::handlers::{HandlerContext, Handlers};
use crate::repos::{Repo, RepoTxn};
use crate::{Hashes, Source};

/// Counts of how the logs of one window were processed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub synced: usize,
    pub already_synced: usize,
    pub unrecognized: usize,
    pub failed: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogOutcome {
    Synced,
    AlreadySynced,
    Unrecognized,
}

/// Persists logs of one source, each in its own transaction.
pub struct LogSyncer<C> {
    pub source: Source,
    pub abi_registry: Arc<AbiRegistry>,
    pub handlers: Arc<Handlers>,
    pub chain_reader: Arc<C>,
    pub idempotency_key: IdempotencyKey,
}

impl<C> Clone for LogSyncer<C> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            abi_registry: self.abi_registry.clone(),
            handlers: self.handlers.clone(),
            chain_reader: self.chain_reader.clone(),
            idempotency_key: self.idempotency_key,
        }
    }
}

impl<C: ChainReader + 'static> LogSyncer<C> {
    /// Syncs `logs` in order. A failing log is rolled back and logged, the
    /// remaining logs still get synced.
    pub async fn sync_all<R: Repo>(&self, repo: &R, logs: &[Log]) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for log in logs {
            match self.sync(repo, log).await {
                Ok(LogOutcome::Synced) => summary.synced += 1,
                Ok(LogOutcome::AlreadySynced) => summary.already_synced += 1,
                Ok(LogOutcome::Unrecognized) => summary.unrecognized += 1,
                Err(sync_error) => {
                    error!(
                        source = %self.source,
                        tx_hash = ?log.transaction_hash,
                        block_number = ?log.block_number,
                        error = %sync_error,
                        "log rolled back"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    pub async fn sync<R: Repo>(&self, repo: &R, log: &Log) -> Result<LogOutcome, SyncError> {
        let log_syncer = self.clone();
        let log = log.clone();

        repo.run_in_transaction(move |txn| {
            async move { log_syncer.sync_in_txn(txn, &log).await }.boxed()
        })
        .await
    }

    async fn sync_in_txn(
        &self,
        txn: &mut dyn RepoTxn,
        log: &Log,
    ) -> Result<LogOutcome, SyncError> {
        let transaction_hash = Hashes::h256_to_string(&events::transaction_hash(log)?);
        let log_index = match self.idempotency_key {
            IdempotencyKey::TransactionHash => None,
            IdempotencyKey::TransactionHashAndLogIndex => Some(events::log_index(log)?),
        };

        if txn.raw_event_exists(&self.source, &transaction_hash, log_index).await? {
            info!(source = %self.source, %transaction_hash, "transaction already synced");
            return Ok(LogOutcome::AlreadySynced);
        }

        let Some(signature) = events::signature(log) else {
            info!(source = %self.source, %transaction_hash, "anonymous log skipped");
            return Ok(LogOutcome::Unrecognized);
        };
        let Some(event) = self.abi_registry.event(&signature) else {
            info!(
                source = %self.source,
                %transaction_hash,
                signature = ?signature,
                "unknown event signature"
            );
            return Ok(LogOutcome::Unrecognized);
        };

        let block_number = events::block_number(log)?;
        let block_timestamp =
            chain_reader::fetch_block_timestamp(self.chain_reader.as_ref(), block_number).await?;

        let raw_event = UnsavedRawEvent::new(log, &self.source, &event.name, block_timestamp)?;
        txn.create_raw_event(&raw_event).await?;

        match self.handlers.get(&signature) {
            Some(handler) => {
                let context = HandlerContext {
                    log,
                    event,
                    source: &self.source,
                    block_timestamp,
                };

                handler.handle_event(txn, context).await?;
            }
            None => info!(
                source = %self.source,
                event = %event.name,
                %transaction_hash,
                "no handler for event, raw event recorded"
            ),
        }

        Ok(LogOutcome::Synced)
    }
}
