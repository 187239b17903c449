use std::time::Instant;

use tracing::{info, warn};

use crate::{
    config::{Difficulty, MiningBudget},
    constants::DEADLINE_CHECK_INTERVAL,
    Block, LedgerError, Result,
};

/// Whether the block's stored hash starts with enough `'0'` hex digits.
/// Evaluates the hash as stored; it never searches.
pub fn satisfies_difficulty(block: &Block, difficulty: Difficulty) -> bool {
    hash_meets_difficulty(block.current_hash(), difficulty)
}

pub fn hash_meets_difficulty(hash: &str, difficulty: Difficulty) -> bool {
    count_leading_zero_hex_digits(hash) >= difficulty.leading_zero_hex_digits()
}

pub fn count_leading_zero_hex_digits(hash: &str) -> u32 {
    hash.bytes().take_while(|b| *b == b'0').count() as u32
}

/// Mine the block by incrementing its nonce until the hash meets `difficulty`,
/// giving up once the budget's attempt count or time limit runs out.
pub fn mine_block(mut block: Block, difficulty: Difficulty, budget: &MiningBudget) -> Result<Block> {
    let started = Instant::now();
    let time_limit = budget.time_limit();
    let start = block.nonce();
    let end = start.saturating_add(budget.max_attempts);

    for nonce in start..end {
        block.set_nonce(nonce);
        if satisfies_difficulty(&block, difficulty) {
            info!(
                "Mined block with nonce {} and hash {}",
                nonce,
                block.current_hash()
            );
            return Ok(block);
        }

        let attempts = nonce - start + 1;
        if let Some(limit) = time_limit {
            if attempts % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() >= limit {
                warn!(attempts, ?limit, "mining time limit elapsed");
                return Err(LedgerError::DeadlineElapsed { limit, attempts });
            }
        }
    }

    let attempts = end - start;
    warn!(attempts, %difficulty, "mining budget exhausted");
    Err(LedgerError::NonceSpaceExhausted {
        difficulty: difficulty.leading_zero_hex_digits(),
        attempts,
    })
}
