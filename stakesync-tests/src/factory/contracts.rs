use stakesync::handlers::stake_handlers;
use stakesync::{AbiRegistry, Contract, Source};

pub const STAKE_ABI: &str = "
event AddPool(address indexed stTokenAddress, uint256 indexed poolWeight, uint256 indexed lastRewardBlock, uint256 minDepositAmount, uint256 unstakeLockedBlocks)
event Deposit(address indexed user, uint256 indexed poolId, uint256 amount)
event RequestUnstake(address indexed user, uint256 indexed poolId, uint256 amount)
event Withdraw(address indexed user, uint256 indexed poolId, uint256 amount, uint256 indexed blockNumber)
event Claim(address indexed user, uint256 indexed poolId, uint256 MetaNodeReward)
event SetMetaNode(address indexed MetaNode)
";

pub const STAKE_CHAIN_ID: u64 = 11155111;
pub const STAKE_CONTRACT_ADDRESS: &str = "0x01A01E8B862F10a3907D0fC7f47eBF5d34190341";
pub const STAKE_CREATED_TX_HASH: &str =
    "0x5b1a9e0c1f0b6bd5c3f4f3e1d7b7a2d64f0d5c8e9a3b2c1d0e9f8a7b6c5d4e3f";
pub const STAKE_CREATED_BLOCK: u64 = 7_000_000;

pub fn stake_source() -> Source {
    Source::new(STAKE_CHAIN_ID, STAKE_CONTRACT_ADDRESS)
}

pub fn stake_contract() -> Contract {
    Contract::new(
        "MetaNodeStake",
        stake_source(),
        STAKE_ABI,
        STAKE_CREATED_TX_HASH,
    )
    .add_handlers(stake_handlers())
}

pub fn stake_abi_registry() -> AbiRegistry {
    AbiRegistry::parse(STAKE_ABI).unwrap()
}
