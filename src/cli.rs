//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Offline event stats - talent reach and registration click aggregation service
#[derive(Parser, Debug)]
#[command(name = "offline-event-stats")]
#[command(version)]
#[command(about = "Offline event talent reach and click statistics service", long_about = None)]
pub struct Cli {
    /// Configuration file path (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Print a sample configuration, or write it to PATH
    GenerateConfig {
        /// Output file path (default: stdout)
        path: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_none() {
        let cli = Cli::try_parse_from(["offline-event-stats"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["offline-event-stats", "serve", "-c", "custom.toml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Serve));
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_generate_config_path() {
        let cli =
            Cli::try_parse_from(["offline-event-stats", "generate-config", "out.toml"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::GenerateConfig {
                path: Some("out.toml".to_string())
            })
        );
    }
}
