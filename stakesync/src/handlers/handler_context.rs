use ethers::abi::Event as AbiEvent;
use ethers::types::Log;

use crate::Source;

pub struct HandlerContext<'a> {
    pub log: &'a Log,
    /// ABI description of the event `log` was emitted for
    pub event: &'a AbiEvent,
    pub source: &'a Source,
    /// Unix timestamp of the block containing `log`
    pub block_timestamp: u64,
}
