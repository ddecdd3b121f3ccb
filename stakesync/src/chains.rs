use derive_more::Display;
use ethers::types::Address;

/// Numeric EVM chain id, e.g. `1` for Ethereum mainnet
pub type ChainId = u64;

/// A contract address on a given chain.
///
/// Every synced contract is identified by its source. Checkpoints are keyed
/// by its `Display` form (`"{chain_id}_{contract_address}"`) and idempotency
/// checks never look outside of it.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("{chain_id}_{contract_address}")]
pub struct Source {
    pub chain_id: ChainId,
    pub contract_address: String,
}

impl Source {
    /// Builds a source, normalising the address to lowercase
    ///
    /// # Example
    /// ```
    /// use stakesync::Source;
    ///
    /// let source = Source::new(11155111, "0x01A01E8B862F10a3907D0fC7f47eBF5d34190341");
    /// assert_eq!(source.checkpoint_key(), "11155111_0x01a01e8b862f10a3907d0fc7f47ebf5d34190341");
    /// ```
    pub fn new(chain_id: ChainId, contract_address: &str) -> Self {
        Self {
            chain_id,
            contract_address: contract_address.trim().to_lowercase(),
        }
    }

    pub fn checkpoint_key(&self) -> String {
        self.to_string()
    }

    pub fn address(&self) -> Option<Address> {
        self.contract_address.parse().ok()
    }
}
