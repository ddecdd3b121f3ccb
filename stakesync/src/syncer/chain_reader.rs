use ethers::prelude::Middleware;
use ethers::providers::{Http, Provider, ProviderError};
use ethers::types::{Block, Filter, Log, TransactionReceipt, TxHash, U64};

use super::SyncError;

/// Read access to an EVM chain.
///
/// Every call may fail or stall; errors are treated as transient by the syncer.
#[async_trait::async_trait]
pub trait ChainReader: Sync + Send {
    async fn get_block_number(&self) -> Result<U64, ProviderError>;
    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError>;
    async fn get_block(&self, block_number: U64) -> Result<Option<Block<TxHash>>, ProviderError>;
    async fn get_transaction_receipt(
        &self,
        transaction_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, ProviderError>;
}

#[async_trait::async_trait]
impl ChainReader for Provider<Http> {
    async fn get_block_number(&self) -> Result<U64, ProviderError> {
        Middleware::get_block_number(self).await
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError> {
        Middleware::get_logs(self, filter).await
    }

    async fn get_block(&self, block_number: U64) -> Result<Option<Block<TxHash>>, ProviderError> {
        Middleware::get_block(self, block_number).await
    }

    async fn get_transaction_receipt(
        &self,
        transaction_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        Middleware::get_transaction_receipt(self, transaction_hash).await
    }
}

pub fn connect(json_rpc_url: &str) -> Result<Provider<Http>, SyncError> {
    Provider::<Http>::try_from(json_rpc_url)
        .map_err(|error| SyncError::InvalidContract(format!("{json_rpc_url}: {error}")))
}

pub async fn fetch_block_timestamp(
    chain_reader: &dyn ChainReader,
    block_number: u64,
) -> Result<u64, SyncError> {
    let block = chain_reader
        .get_block(U64::from(block_number))
        .await?
        .ok_or(SyncError::MissingBlock(block_number))?;

    u64::try_from(block.timestamp).map_err(|_| SyncError::MissingBlock(block_number))
}
