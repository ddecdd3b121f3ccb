use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};

use crate::diesel::schema::pool_info;

/// A staking pool decoded from an `AddPool` event
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = pool_info)]
pub struct UnsavedPool {
    /// Sequence number of the pool within its contract, starting at 0
    pub pool_id: i32,
    pub contract_address: String,
    pub st_token_address: String,
    pub pool_weight: f64,
    pub last_reward_block: i64,
    /// Scaled down by 1e18
    pub min_deposit_amount: f64,
    pub unstake_locked_blocks: i32,
    pub is_active: bool,
    pub created_block: i64,
    pub created_tx: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct Pool {
    pub id: i64,
    pub pool_id: i32,
    pub contract_address: String,
    pub st_token_address: String,
    pub pool_weight: f64,
    pub last_reward_block: i64,
    pub min_deposit_amount: f64,
    pub unstake_locked_blocks: i32,
    pub is_active: bool,
    pub created_block: i64,
    pub created_tx: String,
    pub created_at: DateTime<Utc>,
}
