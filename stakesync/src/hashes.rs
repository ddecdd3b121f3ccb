use ethers::types::{H160, H256};

/// Canonical string forms stored in the database: `0x`-prefixed lowercase hex.
pub struct Hashes;

impl Hashes {
    pub fn h160_to_string(h160: &H160) -> String {
        format!("{h160:#x}")
    }

    pub fn h256_to_string(h256: &H256) -> String {
        format!("{h256:#x}")
    }

    pub fn bytes_to_string(bytes: &[u8]) -> String {
        format!("0x{}", ethers::utils::hex::encode(bytes))
    }
}
