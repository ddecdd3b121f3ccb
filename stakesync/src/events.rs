mod raw_event;

pub use raw_event::{RawEvent, UnsavedRawEvent};

use ethers::types::{Log, TxHash, H256};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("log is missing its {0}")]
    Missing(&'static str),
    #[error("log {0} does not fit the stored column")]
    OutOfRange(&'static str),
}

pub fn block_number(log: &Log) -> Result<u64, LogError> {
    log.block_number
        .map(|block_number| block_number.as_u64())
        .ok_or(LogError::Missing("block number"))
}

pub fn transaction_hash(log: &Log) -> Result<TxHash, LogError> {
    log.transaction_hash.ok_or(LogError::Missing("transaction hash"))
}

pub fn log_index(log: &Log) -> Result<i32, LogError> {
    let log_index = log.log_index.ok_or(LogError::Missing("log index"))?;

    u64::try_from(log_index)
        .ok()
        .and_then(|log_index| i32::try_from(log_index).ok())
        .ok_or(LogError::OutOfRange("log index"))
}

/// The event signature hash (`topic0`), absent for anonymous events
pub fn signature(log: &Log) -> Option<H256> {
    log.topics.first().copied()
}
