use ethers::providers::ProviderError;

use crate::abis::AbiError;
use crate::checkpoints::CheckpointError;
use crate::events::LogError;
use crate::handlers::HandlerError;
use crate::repos::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("chain reader error: {0}")]
    ChainReader(#[from] ProviderError),
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    #[error("repo error: {0}")]
    Repo(#[from] RepoError),
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),
    #[error("receipt of creation transaction {0} not found")]
    MissingReceipt(String),
    #[error("block {0} not found")]
    MissingBlock(u64),
    #[error("malformed log: {0}")]
    MalformedLog(#[from] LogError),
    #[error("invalid contract: {0}")]
    InvalidContract(String),
    #[error("tick did not finish within {0}ms")]
    Timeout(u64),
}

impl From<diesel::result::Error> for SyncError {
    fn from(value: diesel::result::Error) -> Self {
        SyncError::Repo(value.into())
    }
}

impl From<AbiError> for SyncError {
    fn from(value: AbiError) -> Self {
        SyncError::InvalidContract(value.to_string())
    }
}
