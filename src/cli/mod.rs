//! CLI entry points

pub mod serve;

use clap::{Parser, Subcommand};

/// Game collection tracker
#[derive(Parser)]
#[command(name = "game-collection")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["game-collection", "serve"]).unwrap();

        assert!(matches!(cli.command, Command::Serve));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["game-collection"]).is_err());
    }
}
