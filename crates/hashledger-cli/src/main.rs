mod display;

use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hashledger_core::{
    compute_hash, mine::mine, Block, ChainConfig, Difficulty, GenesisPolicy, Ledger,
    MiningStrategy,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::display::{BlockList, ChainReport, Verdict};

#[derive(Parser, Debug)]
#[command(name = "hashledger")]
#[command(about = "Build, mine and verify a hash-linked ledger")]
struct Cli {
    #[command(flatten)]
    chain: ChainArgs,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Command,
}

/// Overrides applied on top of the config file (or the defaults).
#[derive(Args, Debug)]
struct ChainArgs {
    /// JSON chain config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Required leading zero hex digits in a block hash
    #[arg(long, global = true)]
    difficulty: Option<u32>,
    /// Hold the genesis block to the difficulty as well
    #[arg(long, global = true)]
    require_genesis_work: bool,
    /// Recompute each stored hash while verifying
    #[arg(long, global = true)]
    recompute_hashes: bool,
    /// Search nonces on all cores
    #[arg(long, global = true)]
    parallel: bool,
    /// Give up mining after this many nonces
    #[arg(long, global = true)]
    max_attempts: Option<u64>,
    /// Give up mining after this many milliseconds
    #[arg(long, global = true)]
    time_limit_ms: Option<u64>,
}

impl ChainArgs {
    fn load(&self) -> Result<ChainConfig> {
        let mut config = match &self.config {
            Some(path) => ChainConfig::from_json_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ChainConfig::default(),
        };
        if let Some(digits) = self.difficulty {
            config.required_leading_zero_hex_digits =
                Difficulty::new(digits).context("invalid --difficulty")?;
        }
        if self.require_genesis_work {
            config.genesis = GenesisPolicy::RequireWork;
        }
        if self.recompute_hashes {
            config.recompute_hashes = true;
        }
        if self.parallel {
            config.mining.strategy = MiningStrategy::Parallel;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.mining.max_attempts = max_attempts;
        }
        if let Some(ms) = self.time_limit_ms {
            config.mining.time_limit_ms = Some(ms);
        }
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hash a payload, nonce and previous hash
    Hash {
        #[arg(long)]
        payload: String,
        #[arg(long, default_value_t = 0)]
        nonce: u64,
        #[arg(long, default_value = "")]
        previous_hash: String,
    },
    /// Build a chain, verify it, optionally edit one block and verify again
    Demo {
        /// One block per payload, in order
        #[arg(default_values = ["genesis", "Alice pays Bob 5", "Bob pays Carol 2"])]
        payloads: Vec<String>,
        /// Search for a qualifying nonce for every block
        #[arg(long)]
        mine: bool,
        /// Block (from 0) whose payload gets replaced
        #[arg(long, requires = "tamper_payload")]
        tamper_index: Option<usize>,
        #[arg(long, requires = "tamper_index")]
        tamper_payload: Option<String>,
    },
    /// Mine a single block
    Mine {
        #[arg(long)]
        payload: String,
        #[arg(long, default_value = "")]
        previous_hash: String,
    },
    /// Verify a JSON array of blocks
    Verify {
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct HashOut {
    hash: String,
}

fn main() -> Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.chain.load()?;
    let json = cli.json;

    match cli.cmd {
        Command::Hash {
            payload,
            nonce,
            previous_hash,
        } => {
            let hash = compute_hash(&payload, nonce, &previous_hash);
            if json {
                println!("{}", serde_json::to_string(&HashOut { hash })?);
            } else {
                println!("{hash}");
            }
        }
        Command::Demo {
            payloads,
            mine,
            tamper_index,
            tamper_payload,
        } => {
            let mut ledger = Ledger::new(config);
            for payload in payloads {
                if mine {
                    ledger
                        .mine_and_append(payload)
                        .context("mining failed")?;
                } else {
                    ledger.append(payload);
                }
            }
            report(&ledger, json)?;

            if let (Some(index), Some(payload)) = (tamper_index, tamper_payload) {
                ledger
                    .replace_payload(index, payload)
                    .context("replacing payload")?;
                info!(index, "payload replaced");
                if !json {
                    println!("After replacing the payload of block {}:\n", index + 1);
                }
                report(&ledger, json)?;
            }
        }
        Command::Mine {
            payload,
            previous_hash,
        } => {
            let block = Block::new(payload, previous_hash);
            let mined =
                mine(block, config.difficulty(), &config.mining).context("mining failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&mined)?);
            } else {
                print!("{}", BlockList(std::slice::from_ref(&mined)));
            }
        }
        Command::Verify { file } => {
            let raw = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let blocks: Vec<Block> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing blocks from {}", file.display()))?;
            let ledger = Ledger::from_blocks(config, blocks);
            let valid = report(&ledger, json)?;
            if !valid {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the chain and its verdict; returns whether it verified.
fn report(ledger: &Ledger, json: bool) -> Result<bool> {
    let result = ledger.verify_detailed();
    if json {
        println!(
            "{}",
            serde_json::to_string(&ChainReport::new(ledger.blocks(), &result))?
        );
    } else {
        print!("{}", BlockList(ledger.blocks()));
        println!("{}", Verdict(&result));
    }
    Ok(result.is_ok())
}
