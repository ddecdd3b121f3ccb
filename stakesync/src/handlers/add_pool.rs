use chrono::{DateTime, Utc};
use ethers::abi::{Event as AbiEvent, ParamType, Token};
use ethers::types::{Address, Log, U256};
use tracing::{debug, info};

use super::{EventHandler, HandlerContext, HandlerError};
use crate::events;
use crate::pools::UnsavedPool;
use crate::repos::RepoTxn;
use crate::Hashes;

const ADD_POOL_TOPIC_COUNT: usize = 4;
const MIN_DEPOSIT_DECIMALS: u32 = 18;

/// Parameters of an `AddPool` event.
///
/// `event AddPool(address indexed stTokenAddress, uint256 indexed poolWeight,
/// uint256 indexed lastRewardBlock, uint256 minDepositAmount, uint256 unstakeLockedBlocks)`
#[derive(Debug, Clone, PartialEq)]
pub struct AddPoolParams {
    pub st_token_address: Address,
    pub pool_weight: f64,
    pub last_reward_block: u64,
    pub min_deposit_amount: f64,
    pub unstake_locked_blocks: i32,
}

impl AddPoolParams {
    pub fn decode(log: &Log, event: &AbiEvent) -> Result<Self, HandlerError> {
        if log.topics.len() != ADD_POOL_TOPIC_COUNT {
            return Err(HandlerError::TopicCount {
                expected: ADD_POOL_TOPIC_COUNT,
                actual: log.topics.len(),
            });
        }

        let st_token_address = Address::from(log.topics[1]);
        let pool_weight = u256_to_f64(U256::from_big_endian(log.topics[2].as_bytes()))?;
        let last_reward_block = u64::try_from(U256::from_big_endian(log.topics[3].as_bytes()))
            .map_err(|_| HandlerError::OutOfRange("lastRewardBlock"))?;

        let data_kinds: Vec<ParamType> = event
            .inputs
            .iter()
            .filter(|input| !input.indexed)
            .map(|input| input.kind.clone())
            .collect();
        let tokens = ethers::abi::decode(&data_kinds, log.data.as_ref())
            .map_err(|error| HandlerError::Decode(error.to_string()))?;

        let [min_deposit_amount, unstake_locked_blocks, ..] = tokens.as_slice() else {
            return Err(HandlerError::Decode(format!(
                "expected 2 data values, got {}",
                tokens.len()
            )));
        };

        let min_deposit_amount = ethers::utils::format_units(
            uint(min_deposit_amount, "minDepositAmount")?,
            MIN_DEPOSIT_DECIMALS,
        )
        .map_err(|error| HandlerError::Decode(error.to_string()))?
        .parse::<f64>()
        .map_err(|error| HandlerError::Decode(error.to_string()))?;

        let unstake_locked_blocks = u64::try_from(uint(unstake_locked_blocks, "unstakeLockedBlocks")?)
            .ok()
            .and_then(|blocks| i32::try_from(blocks).ok())
            .ok_or(HandlerError::OutOfRange("unstakeLockedBlocks"))?;

        Ok(Self {
            st_token_address,
            pool_weight,
            last_reward_block,
            min_deposit_amount,
            unstake_locked_blocks,
        })
    }
}

fn uint(token: &Token, name: &str) -> Result<U256, HandlerError> {
    token
        .clone()
        .into_uint()
        .ok_or_else(|| HandlerError::Decode(format!("{name} is not an unsigned integer")))
}

fn u256_to_f64(value: U256) -> Result<f64, HandlerError> {
    value
        .to_string()
        .parse()
        .map_err(|_| HandlerError::OutOfRange("poolWeight"))
}

/// Persists a `pool_info` row per `AddPool` event, at most once per transaction
#[derive(Debug, Clone, Copy, Default)]
pub struct AddPoolHandler;

#[async_trait::async_trait]
impl EventHandler for AddPoolHandler {
    fn event_name(&self) -> &'static str {
        "AddPool"
    }

    async fn handle_event<'a>(
        &self,
        txn: &mut dyn RepoTxn,
        context: HandlerContext<'a>,
    ) -> Result<(), HandlerError> {
        let HandlerContext {
            log,
            event,
            source,
            block_timestamp,
            ..
        } = context;

        let params = AddPoolParams::decode(log, event)?;
        let created_tx = Hashes::h256_to_string(&events::transaction_hash(log)?);

        if txn.pool_exists_by_created_tx(&created_tx).await? {
            debug!(%created_tx, "pool already recorded");
            return Ok(());
        }

        let created_block = events::block_number(log)?;
        let pool_id = txn.count_pools(&source.contract_address).await?;

        let pool = UnsavedPool {
            pool_id: i32::try_from(pool_id).map_err(|_| HandlerError::OutOfRange("poolId"))?,
            contract_address: source.contract_address.clone(),
            st_token_address: Hashes::h160_to_string(&params.st_token_address),
            pool_weight: params.pool_weight,
            last_reward_block: i64::try_from(params.last_reward_block)
                .map_err(|_| HandlerError::OutOfRange("lastRewardBlock"))?,
            min_deposit_amount: params.min_deposit_amount,
            unstake_locked_blocks: params.unstake_locked_blocks,
            is_active: true,
            created_block: i64::try_from(created_block)
                .map_err(|_| HandlerError::OutOfRange("createdBlock"))?,
            created_tx,
            created_at: i64::try_from(block_timestamp)
                .ok()
                .and_then(|timestamp| DateTime::<Utc>::from_timestamp(timestamp, 0))
                .ok_or(HandlerError::OutOfRange("blockTimestamp"))?,
        };

        txn.create_pool(&pool).await?;

        info!(
            source = %source,
            pool_id = pool.pool_id,
            st_token_address = %pool.st_token_address,
            "pool added"
        );

        Ok(())
    }
}
