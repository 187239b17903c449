use crate::{
    compute_hash,
    config::{Difficulty, MiningBudget, MiningStrategy},
    pow::{self, hash_meets_difficulty},
    Block, LedgerError, Result,
};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

/// Mines with whichever strategy the budget asks for.
pub fn mine(block: Block, difficulty: Difficulty, budget: &MiningBudget) -> Result<Block> {
    match budget.strategy {
        MiningStrategy::Sequential => pow::mine_block(block, difficulty, budget),
        MiningStrategy::Parallel => mine_block_parallel(&block, difficulty, budget),
    }
}

enum Probe {
    Found(u64),
    OutOfTime(u64),
}

/// Searches the budget's nonce range in parallel, starting at the block's
/// current nonce. Returns the lowest qualifying nonce, the same one the
/// sequential search finds.
pub fn mine_block_parallel(
    block: &Block,
    difficulty: Difficulty,
    budget: &MiningBudget,
) -> Result<Block> {
    let started = Instant::now();
    let time_limit = budget.time_limit();
    let start = block.nonce();
    let end = start.saturating_add(budget.max_attempts);
    let payload = block.payload();
    let previous_hash = block.previous_hash();

    let probe = (start..end).into_par_iter().find_map_first(|nonce| {
        if hash_meets_difficulty(&compute_hash(payload, nonce, previous_hash), difficulty) {
            return Some(Probe::Found(nonce));
        }
        match time_limit {
            Some(limit) if started.elapsed() >= limit => Some(Probe::OutOfTime(nonce)),
            _ => None,
        }
    });

    match probe {
        Some(Probe::Found(nonce)) => {
            let mut mined = block.clone();
            mined.set_nonce(nonce);
            info!(
                "Mined block with nonce {} and hash {}",
                nonce,
                mined.current_hash()
            );
            Ok(mined)
        }
        Some(Probe::OutOfTime(nonce)) => {
            let attempts = nonce - start + 1;
            let limit = time_limit.unwrap_or_default();
            warn!(attempts, ?limit, "parallel mining time limit elapsed");
            Err(LedgerError::DeadlineElapsed { limit, attempts })
        }
        None => {
            let attempts = end - start;
            warn!(attempts, %difficulty, "parallel mining budget exhausted");
            Err(LedgerError::NonceSpaceExhausted {
                difficulty: difficulty.leading_zero_hex_digits(),
                attempts,
            })
        }
    }
}
