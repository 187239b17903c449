pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;

/// `previous_hash` carried by the first block of every chain.
pub const GENESIS_PREVIOUS_HASH: &str = "";

pub const DEFAULT_LEADING_ZERO_HEX_DIGITS: u32 = 2;
pub const DEFAULT_MAX_NONCE_ATTEMPTS: u64 = 1 << 24;

/// How many nonces the sequential miner tries between wall-clock checks.
pub const DEADLINE_CHECK_INTERVAL: u64 = 1024;
