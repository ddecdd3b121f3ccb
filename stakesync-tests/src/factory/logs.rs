use ethers::abi::Token;
use ethers::types::{Address, Bytes, Log, H256, U256, U64};
use ethers::utils::keccak256;
use std::str::FromStr;

use super::{stake_abi_registry, STAKE_CONTRACT_ADDRESS};

/// Deterministic transaction hash per seed
pub fn tx_hash(seed: u64) -> H256 {
    H256::from(keccak256(format!("tx-{seed}").as_bytes()))
}

pub fn st_token_address() -> Address {
    Address::from_str("0x7dfd6013cf8d92b751e63d481b51fe0e4c5abf5e").unwrap()
}

fn signature(event_name: &str) -> H256 {
    stake_abi_registry().signature(event_name).unwrap()
}

fn stake_log(block_number: u64, tx_seed: u64, topics: Vec<H256>, data: Vec<Token>) -> Log {
    Log {
        address: Address::from_str(STAKE_CONTRACT_ADDRESS).unwrap(),
        topics,
        data: Bytes::from(ethers::abi::encode(&data)),
        block_hash: Some(H256::from_low_u64_be(block_number)),
        block_number: Some(U64::from(block_number)),
        transaction_hash: Some(tx_hash(tx_seed)),
        transaction_index: Some(U64::from(0)),
        log_index: Some(U256::from(tx_seed % 1_000)),
        transaction_log_index: None,
        log_type: None,
        removed: Some(false),
    }
}

pub struct AddPoolLog {
    pub pool_weight: u64,
    pub last_reward_block: u64,
    pub min_deposit_amount: U256,
    pub unstake_locked_blocks: u64,
}

impl Default for AddPoolLog {
    fn default() -> Self {
        Self {
            pool_weight: 500,
            last_reward_block: 7_000_100,
            min_deposit_amount: U256::from(2) * U256::exp10(18),
            unstake_locked_blocks: 100,
        }
    }
}

impl AddPoolLog {
    pub fn at(&self, block_number: u64, tx_seed: u64) -> Log {
        stake_log(
            block_number,
            tx_seed,
            vec![
                signature("AddPool"),
                H256::from(st_token_address()),
                H256::from_low_u64_be(self.pool_weight),
                H256::from_low_u64_be(self.last_reward_block),
            ],
            vec![
                Token::Uint(self.min_deposit_amount),
                Token::Uint(U256::from(self.unstake_locked_blocks)),
            ],
        )
    }
}

pub fn add_pool_log(block_number: u64, tx_seed: u64) -> Log {
    AddPoolLog::default().at(block_number, tx_seed)
}

/// An `AddPool` log missing its last indexed topic
pub fn malformed_add_pool_log(block_number: u64, tx_seed: u64) -> Log {
    let mut log = add_pool_log(block_number, tx_seed);
    log.topics.pop();

    log
}

pub fn deposit_log(block_number: u64, tx_seed: u64) -> Log {
    stake_log(
        block_number,
        tx_seed,
        vec![
            signature("Deposit"),
            H256::from(Address::from_low_u64_be(0xa11ce)),
            H256::from_low_u64_be(0),
        ],
        vec![Token::Uint(U256::exp10(18))],
    )
}

/// A log of an ABI event that no handler is registered for
pub fn set_meta_node_log(block_number: u64, tx_seed: u64) -> Log {
    stake_log(
        block_number,
        tx_seed,
        vec![
            signature("SetMetaNode"),
            H256::from(Address::from_low_u64_be(0xbeef)),
        ],
        vec![],
    )
}

/// A log whose signature is not part of the contract ABI
pub fn unknown_log(block_number: u64, tx_seed: u64) -> Log {
    stake_log(
        block_number,
        tx_seed,
        vec![H256::from(keccak256("Paused(address)".as_bytes()))],
        vec![],
    )
}
