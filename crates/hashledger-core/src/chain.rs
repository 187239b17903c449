use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::{ChainConfig, Difficulty, GenesisPolicy},
    constants::GENESIS_PREVIOUS_HASH,
    mine,
    pow::satisfies_difficulty,
    Block, HashHex, LedgerError, Result,
};

/// First problem found while walking a chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainFault {
    #[error("block {index} does not link to its predecessor: expected {expected}, found {found}")]
    BrokenLink {
        index: usize,
        expected: HashHex,
        found: HashHex,
    },

    #[error("block {index} hash {hash} lacks {required} leading zero hex digits")]
    InsufficientWork {
        index: usize,
        hash: HashHex,
        required: u32,
    },

    #[error("block {index} stored hash {stored} does not match its contents ({computed})")]
    HashMismatch {
        index: usize,
        stored: HashHex,
        computed: HashHex,
    },
}

impl ChainFault {
    pub fn index(&self) -> usize {
        match self {
            ChainFault::BrokenLink { index, .. }
            | ChainFault::InsufficientWork { index, .. }
            | ChainFault::HashMismatch { index, .. } => *index,
        }
    }
}

/// `true` when every block links to its predecessor and meets the difficulty.
/// Chains of zero or one block are valid under the default genesis policy.
pub fn verify(blocks: &[Block], config: &ChainConfig) -> bool {
    verify_detailed(blocks, config).is_ok()
}

/// Walks the chain in order and stops at the first fault.
///
/// For each block after the genesis block the link is checked before the
/// work. Stored hashes are trusted unless `config.recompute_hashes` is set.
pub fn verify_detailed(blocks: &[Block], config: &ChainConfig) -> std::result::Result<(), ChainFault> {
    let difficulty = config.difficulty();

    if let Some(genesis) = blocks.first() {
        if config.recompute_hashes {
            check_identity(0, genesis)?;
        }
        if config.genesis == GenesisPolicy::RequireWork {
            check_work(0, genesis, difficulty)?;
        }
    }

    for (offset, pair) in blocks.windows(2).enumerate() {
        let index = offset + 1;
        let (previous, current) = (&pair[0], &pair[1]);

        if config.recompute_hashes {
            check_identity(index, current)?;
        }
        if current.previous_hash() != previous.current_hash() {
            let fault = ChainFault::BrokenLink {
                index,
                expected: previous.current_hash().to_string(),
                found: current.previous_hash().to_string(),
            };
            debug!(%fault, "chain verification failed");
            return Err(fault);
        }
        check_work(index, current, difficulty)?;
    }

    Ok(())
}

fn check_work(index: usize, block: &Block, difficulty: Difficulty) -> std::result::Result<(), ChainFault> {
    if satisfies_difficulty(block, difficulty) {
        return Ok(());
    }
    let fault = ChainFault::InsufficientWork {
        index,
        hash: block.current_hash().to_string(),
        required: difficulty.leading_zero_hex_digits(),
    };
    debug!(%fault, "chain verification failed");
    Err(fault)
}

fn check_identity(index: usize, block: &Block) -> std::result::Result<(), ChainFault> {
    let computed = block.recompute_hash();
    if computed == block.current_hash() {
        return Ok(());
    }
    let fault = ChainFault::HashMismatch {
        index,
        stored: block.current_hash().to_string(),
        computed,
    };
    debug!(%fault, "chain verification failed");
    Err(fault)
}

/// An owned, in-memory chain together with the config it is checked against.
///
/// Appending always links the new block to the current tip.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Ledger {
    config: ChainConfig,
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            blocks: Vec::new(),
        }
    }

    /// Wraps existing blocks as-is; nothing is checked until [`Ledger::verify`].
    pub fn from_blocks(config: ChainConfig, blocks: Vec<Block>) -> Self {
        Self { config, blocks }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Hash the next block should link to.
    pub fn tip_hash(&self) -> &str {
        self.tip()
            .map(Block::current_hash)
            .unwrap_or(GENESIS_PREVIOUS_HASH)
    }

    /// Appends a block with nonce 0 and no work done on it.
    pub fn append(&mut self, payload: impl Into<String>) -> &Block {
        let block = Block::new(payload, self.tip_hash());
        self.push(block)
    }

    /// Appends a block after searching for a nonce within `config.mining`.
    /// Nothing is appended when the search gives up.
    pub fn mine_and_append(&mut self, payload: impl Into<String>) -> Result<&Block> {
        let block = Block::new(payload, self.tip_hash());
        let mined = mine::mine(block, self.config.difficulty(), &self.config.mining)?;
        Ok(self.push(mined))
    }

    /// Replaces the payload of the block at `index`. Later blocks are left as
    /// they are, so the link from `index + 1` breaks.
    pub fn replace_payload(&mut self, index: usize, payload: impl Into<String>) -> Result<()> {
        let len = self.blocks.len();
        let block = self
            .blocks
            .get_mut(index)
            .ok_or(LedgerError::IndexOutOfRange { index, len })?;
        block.replace_payload(payload);
        Ok(())
    }

    pub fn verify(&self) -> bool {
        verify(&self.blocks, &self.config)
    }

    pub fn verify_detailed(&self) -> std::result::Result<(), ChainFault> {
        verify_detailed(&self.blocks, &self.config)
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    fn push(&mut self, block: Block) -> &Block {
        self.blocks.push(block);
        &self.blocks[self.blocks.len() - 1]
    }
}
