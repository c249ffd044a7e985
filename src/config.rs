//! Runtime configuration for the account generator CLI.

use clap::{Parser, Subcommand, ValueEnum};

use crate::batch::BatchMode;

/// Ethereum Account Generator
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Clone)]
pub enum Command {
    /// Generate one random account
    Generate,

    /// Derive the address of an existing private key
    Derive {
        /// Hex private key (64 digits, optional 0x), or `-` to read it from stdin
        private_key: String,
    },

    /// Generate several random accounts at once
    Batch {
        /// Number of accounts (1-100)
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Number of worker threads (default: number of CPU cores)
        #[arg(short = 'w', long, conflicts_with = "sequential")]
        workers: Option<usize>,

        /// Generate on the main thread instead of a worker pool
        #[arg(long, default_value = "false")]
        sequential: bool,
    },
}

/// How results are written to stdout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Labelled, human readable blocks
    #[default]
    Text,
    /// `index,address,private_key` rows with a header
    Csv,
}

impl Config {
    /// Validates the configuration
    ///
    /// Batch size is checked by the engine, not here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Command::Batch {
            workers: Some(0), ..
        } = self.command
        {
            return Err(ConfigError::InvalidWorkers);
        }
        Ok(())
    }

    /// Returns the batch execution mode, defaulting to one worker per CPU.
    pub fn batch_mode(&self) -> BatchMode {
        match self.command {
            Command::Batch {
                sequential: true, ..
            } => BatchMode::Sequential,
            Command::Batch { workers, .. } => BatchMode::Parallel {
                workers: workers.unwrap_or_else(num_cpus::get),
            },
            _ => BatchMode::Sequential,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid worker count: must be at least 1")]
    InvalidWorkers,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("eth_keygen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_batch_defaults() {
        let config = parse(&["batch"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.format, OutputFormat::Text);
        match config.command {
            Command::Batch { count, .. } => assert_eq!(count, 10),
            _ => panic!("expected batch command"),
        }
        assert_eq!(
            config.batch_mode(),
            BatchMode::Parallel {
                workers: num_cpus::get()
            }
        );
    }

    #[test]
    fn test_sequential_batch() {
        let config = parse(&["batch", "-n", "3", "--sequential", "--format", "csv"]);
        assert_eq!(config.batch_mode(), BatchMode::Sequential);
        assert_eq!(config.format, OutputFormat::Csv);
    }

    #[test]
    fn test_zero_workers_invalid() {
        let config = parse(&["batch", "-w", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_workers_conflict_with_sequential() {
        let args = ["eth_keygen", "batch", "-w", "2", "--sequential"];
        assert!(Config::try_parse_from(args).is_err());
    }

    #[test]
    fn test_count_not_checked_by_cli() {
        // The engine owns the 1..=100 bound
        let config = parse(&["batch", "-n", "500"]);
        assert!(config.validate().is_ok());
    }
}
