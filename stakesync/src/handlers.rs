mod add_pool;
mod handler_context;
mod stubs;

pub use add_pool::{AddPoolHandler, AddPoolParams};
pub use handler_context::HandlerContext;
pub use stubs::{ClaimHandler, DepositHandler, RequestUnstakeHandler, WithdrawHandler};

use std::collections::HashMap;
use std::sync::Arc;

use ethers::types::H256;
use tracing::warn;

use crate::abis::AbiRegistry;
use crate::events::LogError;
use crate::repos::{RepoError, RepoTxn};

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    MalformedLog(#[from] LogError),
    #[error("expected {expected} topics, got {actual}")]
    TopicCount { expected: usize, actual: usize },
    #[error("failed to decode event data: {0}")]
    Decode(String),
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
    #[error("repo error: {0}")]
    Repo(#[from] RepoError),
}

/// Decodes one kind of contract event and persists it.
///
/// Handlers run inside the transaction that recorded the raw event, so
/// anything written through `txn` commits or rolls back together with it.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// Name of the ABI event this handler is dispatched for, e.g. `"AddPool"`
    fn event_name(&self) -> &'static str;

    async fn handle_event<'a>(
        &self,
        txn: &mut dyn RepoTxn,
        context: HandlerContext<'a>,
    ) -> Result<(), HandlerError>;
}

/// The handlers of every staking contract event
pub fn stake_handlers() -> Vec<Arc<dyn EventHandler>> {
    vec![
        Arc::new(AddPoolHandler),
        Arc::new(DepositHandler),
        Arc::new(ClaimHandler),
        Arc::new(RequestUnstakeHandler),
        Arc::new(WithdrawHandler),
    ]
}

/// Dispatch table from event signature hash to handler
#[derive(Clone, Default)]
pub struct Handlers {
    by_signature: HashMap<H256, Arc<dyn EventHandler>>,
}

impl Handlers {
    pub fn new(handlers: &[Arc<dyn EventHandler>], abi_registry: &AbiRegistry) -> Self {
        let mut by_signature = HashMap::new();

        for handler in handlers {
            match abi_registry.signature(handler.event_name()) {
                Some(signature) => {
                    by_signature.insert(signature, handler.clone());
                }
                None => warn!(
                    event = handler.event_name(),
                    "event is not declared in the contract ABI, handler skipped"
                ),
            }
        }

        Self { by_signature }
    }

    pub fn get(&self, signature: &H256) -> Option<&Arc<dyn EventHandler>> {
        self.by_signature.get(signature)
    }

    pub fn len(&self) -> usize {
        self.by_signature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_signature.is_empty()
    }
}
