//! Append-only hash-linked ledger: block identity, proof-of-work gate and
//! chain verification.
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod mine;
pub mod pow;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

pub use chain::{verify, verify_detailed, ChainFault, Ledger};
pub use config::{ChainConfig, Difficulty, GenesisPolicy, MiningBudget, MiningStrategy};
pub use constants::GENESIS_PREVIOUS_HASH;
pub use error::{LedgerError, Result};
pub use pow::satisfies_difficulty;

/// Lowercase hex SHA-256 digest, 64 characters.
pub type HashHex = String;

/// Hash of `payload ++ nonce ++ previous_hash`, with the nonce in decimal and
/// no delimiters between the parts.
pub fn compute_hash(payload: &str, nonce: u64, previous_hash: &str) -> HashHex {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hasher.update(previous_hash.as_bytes());
    hex::encode(hasher.finalize())
}

/// One ledger entry.
///
/// Fields are only reachable through getters so `current_hash` always matches
/// the other three. Deserialising recomputes the hash and rejects blocks whose
/// stored hash disagrees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock")]
pub struct Block {
    payload: String,
    nonce: u64,
    previous_hash: HashHex,
    current_hash: HashHex,
}

impl Block {
    /// Builds a block with nonce 0. No proof-of-work search happens here, so
    /// the result may or may not meet any difficulty.
    pub fn new(payload: impl Into<String>, previous_hash: impl Into<String>) -> Self {
        let payload = payload.into();
        let previous_hash = previous_hash.into();
        let current_hash = compute_hash(&payload, 0, &previous_hash);
        Self {
            payload,
            nonce: 0,
            previous_hash,
            current_hash,
        }
    }

    pub fn genesis(payload: impl Into<String>) -> Self {
        Self::new(payload, GENESIS_PREVIOUS_HASH)
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn current_hash(&self) -> &str {
        &self.current_hash
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// Hash of the block's fields as they stand now, ignoring the stored hash.
    pub fn recompute_hash(&self) -> HashHex {
        compute_hash(&self.payload, self.nonce, &self.previous_hash)
    }

    /// Swaps in a new payload, resets the nonce and rehashes. The successor
    /// block, if any, is left pointing at the old hash.
    pub fn replace_payload(&mut self, new_payload: impl Into<String>) {
        self.payload = new_payload.into();
        self.nonce = 0;
        self.current_hash = self.recompute_hash();
        debug!(hash = %self.current_hash, "block payload replaced");
    }

    // Mining is the only other writer of the nonce.
    pub(crate) fn set_nonce(&mut self, nonce: u64) {
        self.nonce = nonce;
        self.current_hash = self.recompute_hash();
    }
}

#[derive(Deserialize)]
struct RawBlock {
    payload: String,
    nonce: u64,
    previous_hash: HashHex,
    current_hash: HashHex,
}

impl TryFrom<RawBlock> for Block {
    type Error = LedgerError;

    fn try_from(raw: RawBlock) -> Result<Self> {
        let computed = compute_hash(&raw.payload, raw.nonce, &raw.previous_hash);
        if computed != raw.current_hash {
            return Err(LedgerError::HashMismatch {
                stored: raw.current_hash,
                computed,
            });
        }
        Ok(Self {
            payload: raw.payload,
            nonce: raw.nonce,
            previous_hash: raw.previous_hash,
            current_hash: raw.current_hash,
        })
    }
}

/// Same as [`Block::new`].
pub fn create(payload: impl Into<String>, previous_hash: impl Into<String>) -> Block {
    Block::new(payload, previous_hash)
}

/// Same as [`Block::replace_payload`].
pub fn replace_payload(block: &mut Block, new_payload: impl Into<String>) {
    block.replace_payload(new_payload);
}
