//! Text and JSON rendering of blocks and verification results.
use std::fmt;

use hashledger_core::{Block, ChainFault};
use serde::Serialize;

/// Blocks numbered from 1, one field per line, a blank line after each.
pub struct BlockList<'a>(pub &'a [Block]);

impl fmt::Display for BlockList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.0.iter().enumerate() {
            writeln!(f, "Block {}:", i + 1)?;
            writeln!(f, "Payload: {}", block.payload())?;
            writeln!(f, "Nonce: {}", block.nonce())?;
            writeln!(f, "Previous Hash: {}", block.previous_hash())?;
            writeln!(f, "Current Hash: {}", block.current_hash())?;
            writeln!(f)?;
        }
        Ok(())
    }
}

pub struct Verdict<'a>(pub &'a Result<(), ChainFault>);

impl fmt::Display for Verdict<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Ok(()) => write!(f, "chain valid"),
            Err(fault) => write!(f, "chain invalid: {fault}"),
        }
    }
}

#[derive(Serialize)]
pub struct ChainReport<'a> {
    pub blocks: &'a [Block],
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl<'a> ChainReport<'a> {
    pub fn new(blocks: &'a [Block], result: &Result<(), ChainFault>) -> Self {
        Self {
            blocks,
            valid: result.is_ok(),
            fault: result.as_ref().err().map(ToString::to_string),
        }
    }
}
