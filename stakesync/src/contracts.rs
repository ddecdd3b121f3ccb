use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use diesel::Queryable;
use serde::Deserialize;
use tracing::warn;

use crate::handlers::EventHandler;
use crate::{ChainId, Source};

/// A contract to sync: where it lives, what it emits and who handles it.
#[derive(Clone)]
pub struct Contract {
    pub name: String,
    pub source: Source,
    pub abi: String,
    /// Hash of the deployment transaction. Syncing starts right after its block.
    pub created_tx_hash: String,
    pub json_rpc_url: Option<String>,
    pub handlers: Vec<Arc<dyn EventHandler>>,
}

impl Contract {
    pub fn new(name: &str, source: Source, abi: &str, created_tx_hash: &str) -> Self {
        Self {
            name: name.to_string(),
            source,
            abi: abi.to_string(),
            created_tx_hash: created_tx_hash.trim().to_lowercase(),
            json_rpc_url: None,
            handlers: vec![],
        }
    }

    pub fn with_json_rpc_url(mut self, json_rpc_url: &str) -> Self {
        self.json_rpc_url = Some(json_rpc_url.to_string());

        self
    }

    pub fn add_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));

        self
    }

    pub fn add_handlers(mut self, handlers: Vec<Arc<dyn EventHandler>>) -> Self {
        self.handlers.extend(handlers);

        self
    }

    /// Joins registry rows to the RPC endpoint of their chain.
    /// Rows without an endpoint are skipped.
    pub fn from_records(records: Vec<ContractRecord>, endpoints: &[ChainEndpoint]) -> Vec<Self> {
        let urls_by_chain: HashMap<_, _> = endpoints
            .iter()
            .map(|endpoint| (endpoint.chain_id, endpoint.url.as_str()))
            .collect();

        records
            .into_iter()
            .filter_map(|record| {
                let Ok(chain_id) = ChainId::try_from(record.chain_id) else {
                    warn!(contract = %record.contract_name, chain_id = record.chain_id, "skipping contract with invalid chain id");
                    return None;
                };

                let Some(url) = urls_by_chain.get(&record.chain_id) else {
                    warn!(contract = %record.contract_name, chain_id, "skipping contract without a chain endpoint");
                    return None;
                };

                Some(
                    Contract::new(
                        &record.contract_name,
                        Source::new(chain_id, &record.contract_address),
                        &record.abi,
                        &record.created_tx_hash,
                    )
                    .with_json_rpc_url(url),
                )
            })
            .collect()
    }
}

impl Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("created_tx_hash", &self.created_tx_hash)
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.event_name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A row of the `chain_contracts` registry
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Deserialize)]
pub struct ContractRecord {
    pub id: i32,
    pub chain_id: i64,
    pub contract_name: String,
    pub abi: String,
    pub contract_address: String,
    pub created_tx_hash: String,
}

/// A row of `chain_endpoints`: the JSON-RPC URL used for a chain
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Deserialize)]
pub struct ChainEndpoint {
    pub id: i32,
    pub chain_id: i64,
    pub url: String,
}
