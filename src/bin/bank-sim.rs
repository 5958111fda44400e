use std::{
    fs::File,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use bank_sim::{
    bin_utils::Service, config::LedgerConfig, registry::in_memory_registry::InMemoryAccountRegistry,
};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use rust_decimal::Decimal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// In-memory banking simulator. Reads one command per line.
#[derive(Parser, Debug)]
#[command(name = "bank-sim", version, about)]
struct Args {
    /// Read commands from this file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Smallest balance an account can be opened with
    #[arg(long)]
    min_opening_balance: Option<Decimal>,

    /// Minimum number of digits in a passcode
    #[arg(long)]
    min_passcode_len: Option<usize>,

    /// How many transactions `history` shows
    #[arg(long)]
    history_limit: Option<usize>,

    /// Seed for account number generation
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn ledger_config(&self) -> LedgerConfig {
        let defaults = LedgerConfig::default();
        LedgerConfig {
            minimum_opening_balance: self
                .min_opening_balance
                .unwrap_or(defaults.minimum_opening_balance),
            min_passcode_len: self.min_passcode_len.unwrap_or(defaults.min_passcode_len),
            history_limit: self.history_limit.unwrap_or(defaults.history_limit),
            ..defaults
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = args.ledger_config();
    let mut registry = match args.seed {
        Some(seed) => InMemoryAccountRegistry::with_rng(config, StdRng::seed_from_u64(seed)),
        None => InMemoryAccountRegistry::new(config),
    };

    let input: Box<dyn Read> = match &args.script {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open `{}`", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let service = Service {
        input,
        output: &mut io::stdout(),
        registry: &mut registry,
        error_printer: Box::new(|line, err| eprintln!("Error at line {line}: {err}")),
    };
    service.run()
}
