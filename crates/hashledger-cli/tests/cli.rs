use std::fs;

use assert_cmd::Command;
use hashledger_core::{Block, ChainConfig, Ledger};
use predicates::prelude::*;
use tempfile::tempdir;

const ALICE_HASH: &str = "e0c5618de2b7f581006ce8c23114d2611d2bd98f7a822f9db2cbaa9dd59140d9";

fn hashledger() -> Command {
    Command::cargo_bin("hashledger").expect("binary built")
}

fn write_chain(blocks: &[Block]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chain.json");
    fs::write(&path, serde_json::to_string_pretty(blocks).unwrap()).unwrap();
    (dir, path)
}

fn mined_blocks() -> Vec<Block> {
    let mut ledger = Ledger::new(ChainConfig::default());
    for payload in ["genesis", "Alice pays Bob 5", "Bob pays Carol 2"] {
        ledger.mine_and_append(payload).unwrap();
    }
    ledger.into_blocks()
}

#[test]
fn hash_prints_digest() {
    hashledger()
        .args(["hash", "--payload", "Alice pays Bob 5"])
        .assert()
        .success()
        .stdout(format!("{ALICE_HASH}\n"));
}

#[test]
fn hash_json_output() {
    hashledger()
        .args(["hash", "--payload", "Alice pays Bob 5", "--json"])
        .assert()
        .success()
        .stdout(format!("{{\"hash\":\"{ALICE_HASH}\"}}\n"));
}

#[test]
fn demo_without_mining_is_invalid() {
    hashledger()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("Block 3:"))
        .stdout(predicate::str::contains("Payload: Alice pays Bob 5"))
        .stdout(predicate::str::contains(
            "chain invalid: block 1 hash 055f845017094fe43bcf6079228d4c55c5013caaea8f8a982f8980ffb0795836 lacks 2 leading zero hex digits",
        ));
}

#[test]
fn demo_with_difficulty_zero_is_valid() {
    hashledger()
        .args(["demo", "--difficulty", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chain valid"));
}

#[test]
fn demo_mined_then_tampered() {
    hashledger()
        .args([
            "demo",
            "--mine",
            "--tamper-index",
            "1",
            "--tamper-payload",
            "Alice pays Bob 500",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("chain valid"))
        .stdout(predicate::str::contains("After replacing the payload of block 2:"))
        .stdout(predicate::str::contains("Payload: Alice pays Bob 500"))
        .stdout(predicate::str::contains("chain invalid: block 1"));
}

#[test]
fn demo_tamper_out_of_range_fails() {
    hashledger()
        .args(["demo", "--tamper-index", "7", "--tamper-payload", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("block index 7 out of range"));
}

#[test]
fn demo_tamper_index_requires_payload() {
    hashledger()
        .args(["demo", "--tamper-index", "1"])
        .assert()
        .failure();
}

#[test]
fn mine_prints_block() {
    hashledger()
        .args(["mine", "--payload", "Alice pays Bob 5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nonce: 332"))
        .stdout(predicate::str::contains(
            "Current Hash: 005c76ba83df2ef425eaaff94eda98495a4102c3b2855f1ae5c472e883bd7801",
        ));
}

#[test]
fn mine_parallel_json() {
    let out = hashledger()
        .args(["mine", "--payload", "Alice pays Bob 5", "--parallel", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let block: Block = serde_json::from_slice(&out).unwrap();
    assert_eq!(block.nonce(), 332);
}

#[test]
fn mine_gives_up_within_budget() {
    hashledger()
        .args([
            "mine",
            "--payload",
            "Alice pays Bob 5",
            "--difficulty",
            "64",
            "--max-attempts",
            "10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mining failed"));
}

#[test]
fn rejects_out_of_range_difficulty() {
    hashledger()
        .args(["hash", "--payload", "x", "--difficulty", "65"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --difficulty"));
}

#[test]
fn verify_valid_chain_file() {
    let (_dir, path) = write_chain(&mined_blocks());
    hashledger()
        .arg("verify")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("chain valid"));
}

#[test]
fn verify_broken_chain_file_exits_nonzero() {
    let mut blocks = mined_blocks();
    blocks.swap(1, 2);
    let (_dir, path) = write_chain(&blocks);
    hashledger()
        .arg("verify")
        .arg(&path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("chain invalid: block 1 does not link"));
}

#[test]
fn verify_rejects_forged_hash() {
    let (_dir, path) = write_chain(&mined_blocks());
    let forged = fs::read_to_string(&path)
        .unwrap()
        .replace("Alice pays Bob 5", "Alice pays Bob 9");
    fs::write(&path, forged).unwrap();
    hashledger()
        .arg("verify")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("block hash mismatch"));
}

#[test]
fn verify_with_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{"genesis":"require_work"}"#).unwrap();

    let mut ledger = Ledger::new(ChainConfig::default());
    ledger.append("genesis");
    ledger.mine_and_append("Alice pays Bob 5").unwrap();
    let (_chain_dir, chain_path) = write_chain(ledger.blocks());

    hashledger()
        .arg("verify")
        .arg(&chain_path)
        .assert()
        .success();
    hashledger()
        .arg("--config")
        .arg(&config_path)
        .arg("verify")
        .arg(&chain_path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("chain invalid: block 0"));
}
