//! Ethereum Account Generator CLI
//!
//! Usage:
//!   eth_keygen generate                 # One random account
//!   eth_keygen derive 0x<64 hex>        # Address of an existing key
//!   echo <key> | eth_keygen derive -    # Same, key read from stdin
//!   eth_keygen batch -n 25 --format csv # 25 accounts as CSV

use std::io::{self, BufRead};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use eth_keygen::config::{Command, OutputFormat};
use eth_keygen::{Account, Config, Engine};

fn main() {
    init_tracing();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let engine = Engine::new().batch_mode(config.batch_mode());
    ctrlc_handler(engine.stop_flag_clone());

    match run(&config.command, &engine) {
        Ok(accounts) => print_accounts(&accounts, config.format),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(command: &Command, engine: &Engine) -> Result<Vec<Account>, Box<dyn std::error::Error>> {
    let accounts = match command {
        Command::Generate => vec![engine.generate()?],
        Command::Derive { private_key } => {
            let key = read_private_key(private_key)?;
            vec![engine.derive(&key)?]
        }
        Command::Batch { count, .. } => engine.generate_batch(*count)?,
    };
    Ok(accounts)
}

/// Logs go to stderr so stdout carries only results.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Resolves the `derive` argument, reading one line from stdin for `-`.
fn read_private_key(arg: &str) -> Result<Zeroizing<String>, Box<dyn std::error::Error>> {
    if arg != "-" {
        return Ok(Zeroizing::new(arg.to_string()));
    }

    let mut line = Zeroizing::new(String::new());
    io::stdin().lock().read_line(&mut line)?;
    Ok(Zeroizing::new(line.trim().to_string()))
}

fn print_accounts(accounts: &[Account], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for (i, account) in accounts.iter().enumerate() {
                if accounts.len() > 1 {
                    println!("=== Account #{} ===", i + 1);
                }
                println!("Address:     {}", account.address);
                println!("Private Key: {}", account.secret);
                println!();
            }
        }
        OutputFormat::Csv => {
            println!("index,address,private_key");
            for (i, account) in accounts.iter().enumerate() {
                println!("{},{},{}", i + 1, account.address, account.secret);
            }
        }
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }
}
