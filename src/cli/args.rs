//! CLI argument definitions using clap
//!
//! Commands:
//! - gridsql compile [--config <path>]
//! - gridsql explain [--config <path>]
//! - gridsql shape [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gridsql - compiles grid row requests into parameterized SQL
#[derive(Parser, Debug)]
#[command(name = "gridsql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile one request read from stdin
    Compile {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compile one request and describe how it compiled
    Explain {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Shape executed rows into a response page
    Shape {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Command {
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Compile { config }
            | Command::Explain { config }
            | Command::Shape { config } => config.as_ref(),
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compile_with_config() {
        let cli = Cli::try_parse_from(["gridsql", "compile", "--config", "grid.json"]).unwrap();
        match &cli.command {
            Command::Compile { config } => {
                assert_eq!(config.as_deref(), Some(std::path::Path::new("grid.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_config_is_optional() {
        let cli = Cli::try_parse_from(["gridsql", "shape"]).unwrap();
        assert!(cli.command.config_path().is_none());
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["gridsql", "execute"]).is_err());
    }
}
