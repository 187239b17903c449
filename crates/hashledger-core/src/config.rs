use std::{fmt, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_LEADING_ZERO_HEX_DIGITS, DEFAULT_MAX_NONCE_ATTEMPTS, HASH_HEX_SIZE},
    LedgerError, Result,
};

/// Number of leading `'0'` hex characters a block hash needs to count as mined.
///
/// Each extra digit multiplies the expected search cost by 16.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Difficulty(u32);

impl Difficulty {
    pub fn new(leading_zero_hex_digits: u32) -> Result<Self> {
        if leading_zero_hex_digits as usize > HASH_HEX_SIZE {
            return Err(LedgerError::DifficultyOutOfRange {
                requested: leading_zero_hex_digits,
                max: HASH_HEX_SIZE,
            });
        }
        Ok(Self(leading_zero_hex_digits))
    }

    pub fn leading_zero_hex_digits(self) -> u32 {
        self.0
    }

    /// Average number of nonces a search has to try.
    pub fn expected_attempts(self) -> f64 {
        16f64.powi(self.0 as i32)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_LEADING_ZERO_HEX_DIGITS)
    }
}

impl TryFrom<u32> for Difficulty {
    type Error = LedgerError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Difficulty> for u32 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the first block of a chain has to meet the difficulty too.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenesisPolicy {
    /// Only blocks after the genesis block are checked for work.
    #[default]
    Exempt,
    RequireWork,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningStrategy {
    #[default]
    Sequential,
    /// Split the nonce range across the rayon thread pool.
    Parallel,
}

/// Upper bounds on a nonce search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiningBudget {
    pub max_attempts: u64,
    pub time_limit_ms: Option<u64>,
    pub strategy: MiningStrategy,
}

impl MiningBudget {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

impl Default for MiningBudget {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_NONCE_ATTEMPTS,
            time_limit_ms: None,
            strategy: MiningStrategy::default(),
        }
    }
}

/// Everything verification and mining need to know about a chain. Passed
/// explicitly into each call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChainConfig {
    pub required_leading_zero_hex_digits: Difficulty,
    pub genesis: GenesisPolicy,
    /// Recompute every stored hash during verification.
    pub recompute_hashes: bool,
    pub mining: MiningBudget,
}

impl ChainConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            required_leading_zero_hex_digits: difficulty,
            ..Self::default()
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.required_leading_zero_hex_digits
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
