//! Argument parsing for the playdwh binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use playdwh_core::SqlDialect;

/// Song-play warehouse loader.
#[derive(Parser, Debug)]
#[command(name = "playdwh")]
#[command(about = "Song-play warehouse loader", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "playdwh.toml")]
    pub config: PathBuf,

    /// SQL dialect to render statements for
    #[arg(long, global = true, value_enum, default_value = "redshift")]
    pub dialect: DialectArg,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop and recreate the seven warehouse tables
    CreateTables,
    /// Bulk-load staging tables and run the star-schema transforms
    Etl,
    /// Report row counts for every warehouse table
    Counts(CountsArgs),
}

/// Arguments for the counts command.
#[derive(Parser, Debug)]
pub struct CountsArgs {
    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl CountsArgs {
    /// Validate arguments and return error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.format != "text" && self.format != "json" {
            return Err(format!("Unsupported format: {}", self.format));
        }
        Ok(())
    }
}

/// SQL dialect flag.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialectArg {
    /// Amazon Redshift
    Redshift,
    /// Stock PostgreSQL
    Postgres,
}

impl From<DialectArg> for SqlDialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Redshift => SqlDialect::Redshift,
            DialectArg::Postgres => SqlDialect::Postgres,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["playdwh", "etl"]);
        assert_eq!(cli.config, PathBuf::from("playdwh.toml"));
        assert_eq!(cli.dialect, DialectArg::Redshift);
        assert!(matches!(cli.command, Commands::Etl));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["playdwh", "create-tables", "--dialect", "postgres"]);
        assert_eq!(cli.dialect, DialectArg::Postgres);
        assert!(matches!(cli.command, Commands::CreateTables));
    }

    #[test]
    fn test_counts_format_validation() {
        let cli = Cli::parse_from(["playdwh", "counts", "--format", "json"]);
        match cli.command {
            Commands::Counts(args) => {
                assert!(args.validate().is_ok());
                assert_eq!(args.format, "json");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let args = CountsArgs {
            format: "yaml".to_string(),
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_dialect_flag_maps_to_sql_dialect() {
        assert_eq!(SqlDialect::from(DialectArg::Redshift), SqlDialect::Redshift);
        assert_eq!(SqlDialect::from(DialectArg::Postgres), SqlDialect::Postgres);
    }
}
