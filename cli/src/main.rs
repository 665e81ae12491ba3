//! pubrand: commit-then-reveal randomness for finality signers.

use anyhow::Context;
use clap::Parser;
use pubrand_cli::{commands, CliConfig};
use pubrand_randomness::SignerContext;
use pubrand_utils::LogFormat;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pubrand", about = "Committed one-time randomness and finality signatures")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "PUBRAND_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "PUBRAND_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "PUBRAND_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Generate a signer key pair.
    GenerateKeypair {
        /// Derive the key from a seeded RNG (testing only).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate a randomness batch and its signed commitment.
    GeneratePubRandCommitment {
        /// Height of the first batch entry.
        start_height: u64,

        /// Number of entries.
        num_pub_rand: u64,

        /// Hex-encoded 32-byte signer secret key.
        #[arg(long, env = "PUBRAND_SECRET_KEY", hide_env_values = true)]
        secret_key: String,

        /// Draw randomness from a seeded RNG (testing only).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Sign a block with the batch entry for its height. The batch JSON is
    /// read from stdin.
    GenerateFinalitySig {
        height: u64,

        /// Hex-encoded 32-byte block hash.
        block_hash: String,

        /// Hex-encoded 32-byte signer secret key.
        #[arg(long, env = "PUBRAND_SECRET_KEY", hide_env_values = true)]
        secret_key: String,

        /// Consumed-index ledger file; overrides `[signer] consumed_ledger`.
        #[arg(long, env = "PUBRAND_CONSUMED_LEDGER")]
        consumed_ledger: Option<PathBuf>,
    },

    /// Print the effective configuration.
    ShowConfig,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    pubrand_utils::init_logging(config.logging.format, &config.logging.level);

    match cli.command {
        Command::GenerateKeypair { seed } => print_json(&commands::generate_keypair(seed)),

        Command::GeneratePubRandCommitment {
            start_height,
            num_pub_rand,
            secret_key,
            seed,
        } => {
            let signer = SignerContext::from_hex(&secret_key)?;
            tracing::info!(
                signer = %signer.public_key(),
                start_height,
                num_pub_rand,
                "generating commitment"
            );
            print_json(&commands::generate_commitment(
                &signer,
                start_height,
                num_pub_rand,
                seed,
            )?)
        }

        Command::GenerateFinalitySig {
            height,
            block_hash,
            secret_key,
            consumed_ledger,
        } => {
            let signer = SignerContext::from_hex(&secret_key)?;
            let ledger = consumed_ledger.or(config.signer.consumed_ledger);
            tracing::info!("reading randomness batch from stdin");
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("reading batch from stdin")?;
            print_json(&commands::generate_finality_sig(
                signer,
                &input,
                height,
                &block_hash,
                ledger.as_deref(),
            )?)
        }

        Command::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
