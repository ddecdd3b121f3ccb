use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use ethers::types::Log;

use super::LogError;
use crate::diesel::schema::contract_events;
use crate::{Hashes, Source};

/// A log as it is recorded in the `contract_events` ledger, before insertion
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = contract_events)]
pub struct UnsavedRawEvent {
    pub chain_id: i64,
    pub contract_address: String,
    pub event_name: String,
    pub topic0: String,
    pub topic1: Option<String>,
    pub topic2: Option<String>,
    pub topic3: Option<String>,
    pub data: String,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub transaction_hash: String,
    pub log_index: i32,
}

impl UnsavedRawEvent {
    pub fn new(
        log: &Log,
        source: &Source,
        event_name: &str,
        block_timestamp: u64,
    ) -> Result<Self, LogError> {
        let topic = |index: usize| log.topics.get(index).map(Hashes::h256_to_string);

        Ok(Self {
            chain_id: i64::try_from(source.chain_id)
                .map_err(|_| LogError::OutOfRange("chain id"))?,
            contract_address: source.contract_address.clone(),
            event_name: event_name.to_string(),
            topic0: topic(0).ok_or(LogError::Missing("event signature"))?,
            topic1: topic(1),
            topic2: topic(2),
            topic3: topic(3),
            data: Hashes::bytes_to_string(&log.data),
            block_number: i64::try_from(super::block_number(log)?)
                .map_err(|_| LogError::OutOfRange("block number"))?,
            block_timestamp: i64::try_from(block_timestamp)
                .map_err(|_| LogError::OutOfRange("block timestamp"))?,
            transaction_hash: Hashes::h256_to_string(&super::transaction_hash(log)?),
            log_index: super::log_index(log)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct RawEvent {
    pub id: i64,
    pub chain_id: i64,
    pub contract_address: String,
    pub event_name: String,
    pub topic0: String,
    pub topic1: Option<String>,
    pub topic2: Option<String>,
    pub topic3: Option<String>,
    pub data: String,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub transaction_hash: String,
    pub log_index: i32,
    pub inserted_at: DateTime<Utc>,
}
