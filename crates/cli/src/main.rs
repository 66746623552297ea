use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use playdwh_cli::cli::{Cli, Commands};
use playdwh_cli::{run_counts, run_create_tables, run_etl};
use playdwh_core::{EtlConfig, SqlDialect};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = EtlConfig::from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let dialect: SqlDialect = cli.dialect.into();

    match cli.command {
        Commands::CreateTables => {
            let stats = run_create_tables(&config, dialect).await?;
            println!("Schema ready: {}", stats.summary());
        }
        Commands::Etl => {
            let summary = run_etl(&config, dialect).await?;
            println!("Load complete: {}", summary.summary());
        }
        Commands::Counts(args) => {
            args.validate().map_err(anyhow::Error::msg)?;
            let counts = run_counts(&config).await?;
            if args.format == "json" {
                let entries: Vec<_> = counts
                    .entries()
                    .iter()
                    .map(|(table, rows)| {
                        serde_json::json!({ "table": table.name(), "rows": rows })
                    })
                    .collect();
                let payload = serde_json::json!({ "counts": entries });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print!("{}", counts.summary());
                let empty = counts.empty_tables();
                if !empty.is_empty() {
                    let names: Vec<&str> = empty.iter().map(|table| table.name()).collect();
                    println!("Warning: empty tables: {}", names.join(", "));
                }
            }
        }
    }
    Ok(())
}
