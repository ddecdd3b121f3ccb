use std::collections::HashMap;

use ethers::abi::{Abi, Event as AbiEvent};
use ethers::types::H256;

#[derive(Debug, thiserror::Error)]
pub enum AbiError {
    #[error("invalid JSON ABI: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid human-readable ABI: {0}")]
    HumanReadable(String),
}

/// Event lookup table for one contract interface, built once per sync task.
///
/// Accepts either a JSON ABI (`[{"type": "event", ...}]`) or newline
/// separated human-readable signatures (`event AddPool(...)`).
#[derive(Debug, Clone, Default)]
pub struct AbiRegistry {
    events_by_signature: HashMap<H256, AbiEvent>,
    signatures_by_name: HashMap<String, H256>,
}

impl AbiRegistry {
    pub fn parse(abi: &str) -> Result<Self, AbiError> {
        let abi = abi.trim();

        let parsed = if abi.starts_with('[') {
            serde_json::from_str::<Abi>(abi)?
        } else {
            let signatures: Vec<_> =
                abi.lines().map(str::trim).filter(|line| !line.is_empty()).collect();

            ethers::abi::parse_abi(&signatures)
                .map_err(|error| AbiError::HumanReadable(error.to_string()))?
        };

        Ok(Self::from_abi(&parsed))
    }

    pub fn from_abi(abi: &Abi) -> Self {
        let mut registry = Self::default();

        for event in abi.events() {
            let signature = event.signature();

            registry.signatures_by_name.insert(event.name.clone(), signature);
            registry.events_by_signature.insert(signature, event.clone());
        }

        registry
    }

    pub fn event(&self, signature: &H256) -> Option<&AbiEvent> {
        self.events_by_signature.get(signature)
    }

    pub fn event_name(&self, signature: &H256) -> Option<&str> {
        self.event(signature).map(|event| event.name.as_str())
    }

    pub fn signature(&self, event_name: &str) -> Option<H256> {
        self.signatures_by_name.get(event_name).copied()
    }

    pub fn len(&self) -> usize {
        self.events_by_signature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events_by_signature.is_empty()
    }
}
