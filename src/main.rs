//! Ethereum Event Proof Verifier
//!
//! Command-line front end for light-client receipt and header-chain proofs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use eth_event_proof::error::{DecodeError, ProofError};
use eth_event_proof::verifier::{ChainProofInput, ReceiptProofInput};
use eth_event_proof::{EventProof, HeaderField, VerifierConfig};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "event-proof",
    about = "Verify Ethereum receipt inclusion and header chain proofs",
    version,
    long_about = r#"Verify that a transaction receipt, and so the events it logs, is part of
a block whose hash you already trust, and that a run of block headers links
together by parent hash.

Inputs are JSON files with hex-encoded RLP byte strings.

Exit status:
  0  proof is valid
  1  proof parsed but was rejected
  2  input could not be read, decoded or verified within limits"#
)]
struct Cli {
    /// JSON file overriding verification limits
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log verification steps (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prove a receipt is included in a trusted block
    #[command(
        about = "Verify a receipt inclusion proof against a trusted block hash",
        long_about = r#"Verify a receipt inclusion proof.

The proof holds when:
- The RLP header hashes to the trusted block hash
- The header's receiptsRoot anchors the witness
- The witness leads along the path to exactly the given receipt

Input: JSON file with blockHash, header, receipt, path and witness"#
    )]
    ProveReceipt {
        /// Path to JSON input file containing the proof
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Prove a sequence of headers forms a chain
    #[command(
        about = "Verify that headers link to each other by parent hash",
        long_about = r#"Verify a header chain, oldest header first.

Each header's parentHash must equal the hash of the header before it. With
an anchor, the first header must also hash to the anchor.

Input: JSON file with headers and an optional anchor"#
    )]
    ProveBlocks {
        /// Path to JSON input file containing the headers
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },

    /// Print one field of an RLP-encoded header
    Extract {
        /// Hex-encoded RLP header
        #[arg(long, value_name = "HEX")]
        header: String,

        /// Field name, e.g. receiptsRoot or parentHash
        #[arg(short, long, default_value = "receiptsRoot")]
        field: HeaderField,
    },

    /// Display verification limits and data layout
    Info,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => read_json::<VerifierConfig>(path)?,
        None => VerifierConfig::default(),
    };
    let verifier = EventProof::new(config);

    match cli.command {
        Commands::ProveReceipt { input } => prove_receipt(&verifier, &input),
        Commands::ProveBlocks { input } => prove_blocks(&verifier, &input),
        Commands::Extract { header, field } => {
            extract(&header, field)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info => {
            show_system_info(verifier.config());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

fn prove_receipt(verifier: &EventProof, input_path: &Path) -> anyhow::Result<ExitCode> {
    log::info!("Reading receipt proof from: {}", input_path.display());
    let input: ReceiptProofInput = read_json(input_path)?;

    log::info!("Verifying receipt inclusion in block {}", input.block_hash);
    let result = verifier.check_receipt_inclusion(
        input.block_hash,
        &input.header,
        &input.receipt,
        &input.path,
        &input.witness,
    );
    report(result)
}

fn prove_blocks(verifier: &EventProof, input_path: &Path) -> anyhow::Result<ExitCode> {
    log::info!("Reading header chain from: {}", input_path.display());
    let input: ChainProofInput = read_json(input_path)?;

    log::info!("Verifying chain of {} headers", input.headers.len());
    let result = verifier.check_blocks(&input.headers, input.anchor);
    report(result)
}

fn report(result: Result<(), ProofError>) -> anyhow::Result<ExitCode> {
    match result {
        Ok(()) => {
            println!("valid");
            Ok(ExitCode::SUCCESS)
        }
        Err(ProofError::Rejected(reason)) => {
            println!("rejected: {reason}");
            Ok(ExitCode::from(1))
        }
        Err(ProofError::Decode(err @ DecodeError::LimitExceeded(_))) => {
            Err(err).context("Input is too large for the configured limits (see --config)")
        }
        Err(ProofError::Decode(err)) => Err(err).context("Input could not be decoded"),
    }
}

fn extract(header_hex: &str, field: HeaderField) -> anyhow::Result<()> {
    let rlp_header = hex::decode(header_hex.trim().trim_start_matches("0x"))
        .with_context(|| "Header is not valid hex")?;

    let value = eth_event_proof::extract_field(&rlp_header, field)
        .with_context(|| format!("Failed to extract {field}"))?;

    println!("0x{}", hex::encode(value));
    Ok(())
}

fn show_system_info(config: &VerifierConfig) {
    use eth_event_proof::constants::*;

    println!("Ethereum Event Proof - System Information");
    println!("=========================================");
    println!();

    println!("Verification Limits:");
    println!("  Max Witness Nodes:        {}", config.max_witness_nodes);
    println!("  Max Node Size:            {} bytes", config.max_node_len);
    println!("  Max Chain Length:         {}", config.max_chain_len);
    println!("  Exact Witness Required:   {}", config.require_exact_witness);
    println!("  Max RLP Nesting:          {}", limits::MAX_RLP_DEPTH);
    println!();

    println!("Data Layout:");
    println!("  Header Fields:            {} (pre-London)", HEADER_FIELD_COUNT);
    println!("  Receipt Fields:           {} (post-Byzantium)", RECEIPT_FIELD_COUNT);
    println!("  Logs Bloom:               {} bytes", BLOOM_LEN);
    println!("  Inline Node Threshold:    {} bytes", INLINE_NODE_THRESHOLD);
    println!("  Empty Trie Root:          {}", EMPTY_TRIE_ROOT);
    println!();

    println!("Cryptographic Parameters:");
    println!("  Hash Function:            Keccak256");
    println!("  Trie:                     Merkle-Patricia (hex-prefix paths)");
    println!("  Receipt Key:              RLP(transaction index)");
}
