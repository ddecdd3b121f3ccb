use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

use ethers::providers::ProviderError;
use ethers::types::{Block, Filter, Log, TransactionReceipt, TxHash, U256, U64};
use stakesync::ChainReader;

use super::{STAKE_CREATED_BLOCK, STAKE_CREATED_TX_HASH};

pub fn block_timestamp(block_number: u64) -> u64 {
    1_700_000_000 + block_number * 12
}

/// Chain reader over a fixed set of logs and receipts.
///
/// Records every filter it is queried with.
#[derive(Debug, Default)]
pub struct FakeChainReader {
    current_block: Mutex<u64>,
    logs: Mutex<Vec<Log>>,
    creation_blocks: HashMap<TxHash, u64>,
    filters: Mutex<Vec<Filter>>,
    failing_get_logs: Mutex<bool>,
    get_logs_delay: Option<Duration>,
}

impl FakeChainReader {
    pub fn new(current_block: u64) -> Self {
        Self {
            current_block: Mutex::new(current_block),
            ..Default::default()
        }
    }

    /// A chain where the stake contract was deployed at `STAKE_CREATED_BLOCK`
    pub fn with_stake_contract(current_block: u64) -> Self {
        Self::new(current_block).with_creation_receipt(STAKE_CREATED_TX_HASH, STAKE_CREATED_BLOCK)
    }

    pub fn with_creation_receipt(mut self, transaction_hash: &str, block_number: u64) -> Self {
        self.creation_blocks
            .insert(TxHash::from_str(transaction_hash).unwrap(), block_number);

        self
    }

    pub fn with_logs(self, logs: Vec<Log>) -> Self {
        *self.logs.lock().unwrap() = logs;

        self
    }

    pub fn with_get_logs_delay(mut self, delay: Duration) -> Self {
        self.get_logs_delay = Some(delay);

        self
    }

    pub fn set_current_block(&self, current_block: u64) {
        *self.current_block.lock().unwrap() = current_block;
    }

    pub fn fail_get_logs(&self, failing: bool) {
        *self.failing_get_logs.lock().unwrap() = failing;
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.filters.lock().unwrap().clone()
    }

    /// `(from, to)` of every filter queried so far
    pub fn queried_ranges(&self) -> Vec<(u64, u64)> {
        self.filters()
            .iter()
            .map(|filter| {
                (
                    filter.get_from_block().unwrap().as_u64(),
                    filter.get_to_block().unwrap().as_u64(),
                )
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ChainReader for FakeChainReader {
    async fn get_block_number(&self) -> Result<U64, ProviderError> {
        Ok(U64::from(*self.current_block.lock().unwrap()))
    }

    async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError> {
        self.filters.lock().unwrap().push(filter.clone());

        if let Some(delay) = self.get_logs_delay {
            tokio::time::sleep(delay).await;
        }

        if *self.failing_get_logs.lock().unwrap() {
            return Err(ProviderError::CustomError("connection reset".to_string()));
        }

        let from = filter.get_from_block().map_or(0, |block| block.as_u64());
        let to = filter.get_to_block().map_or(u64::MAX, |block| block.as_u64());

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| {
                let block_number = log.block_number.unwrap().as_u64();

                from <= block_number && block_number <= to
            })
            .cloned()
            .collect())
    }

    async fn get_block(&self, block_number: U64) -> Result<Option<Block<TxHash>>, ProviderError> {
        Ok(Some(Block {
            number: Some(block_number),
            timestamp: U256::from(block_timestamp(block_number.as_u64())),
            ..Default::default()
        }))
    }

    async fn get_transaction_receipt(
        &self,
        transaction_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, ProviderError> {
        Ok(self
            .creation_blocks
            .get(&transaction_hash)
            .map(|block_number| TransactionReceipt {
                transaction_hash,
                block_number: Some(U64::from(*block_number)),
                ..Default::default()
            }))
    }
}
