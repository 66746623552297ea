//! Command-line workflows for the playdwh loader.
//!
//! Each `run_*` function owns the full lifecycle of one subcommand: it
//! connects to the cluster, drives its statement sequences over a single
//! session, and closes the connection before returning.

use std::future::Future;

use anyhow::{Context, Result};
use playdwh_core::{EtlConfig, QueryCatalog, SqlDialect};
use playdwh_warehouse::{
    collect_table_counts, create_tables, load_staging_tables, populate_warehouse_tables, RunStats,
    TableCounts, WarehouseClient, WarehouseResult, WarehouseSession,
};
use tracing::info;

pub mod cli;
pub mod progress;

use progress::PhaseProgress;

/// Outcome of a full `etl` run.
#[derive(Debug, Clone, Copy)]
pub struct EtlSummary {
    /// Stats for the staging bulk loads.
    pub staging: RunStats,
    /// Stats for the fact and dimension transforms.
    pub transform: RunStats,
}

impl EtlSummary {
    /// One-line description for terminal output.
    pub fn summary(&self) -> String {
        format!(
            "staging: {}; transform: {}",
            self.staging.summary(),
            self.transform.summary()
        )
    }
}

/// Drops and recreates every staging and warehouse table.
pub async fn run_create_tables(config: &EtlConfig, dialect: SqlDialect) -> Result<RunStats> {
    let catalog = QueryCatalog::new(config, dialect);
    let (client, mut session) = open_session(config).await?;
    let result = run_phase(
        "dropping and recreating tables",
        "schema ready",
        create_tables(&mut session, &catalog),
    )
    .await;
    drop(session);
    client.close().await;
    result
}

/// Runs the full load: staging copies first, then the star-schema
/// transforms. The run stops at the first failed statement, keeping
/// everything committed before it.
pub async fn run_etl(config: &EtlConfig, dialect: SqlDialect) -> Result<EtlSummary> {
    let catalog = QueryCatalog::new(config, dialect);
    let (client, mut session) = open_session(config).await?;
    let result = run_load_phases(&mut session, &catalog).await;
    drop(session);
    client.close().await;
    let summary = result?;
    info!(
        staging_statements = summary.staging.statements_executed,
        transform_statements = summary.transform.statements_executed,
        "etl run complete"
    );
    Ok(summary)
}

/// Collects row counts for every staging and warehouse table.
pub async fn run_counts(config: &EtlConfig) -> Result<TableCounts> {
    let (client, mut session) = open_session(config).await?;
    let counts = collect_table_counts(&mut session)
        .await
        .context("counting warehouse rows");
    drop(session);
    client.close().await;
    counts
}

async fn open_session(config: &EtlConfig) -> Result<(WarehouseClient, WarehouseSession)> {
    let client = WarehouseClient::connect(&config.cluster)
        .await
        .context("connecting to the warehouse cluster")?;
    let session = client
        .session()
        .await
        .context("opening a warehouse session")?;
    Ok((client, session))
}

async fn run_load_phases(
    session: &mut WarehouseSession,
    catalog: &QueryCatalog,
) -> Result<EtlSummary> {
    let staging = run_phase(
        "bulk-loading staging tables",
        "staging loaded",
        load_staging_tables(&mut *session, catalog),
    )
    .await?;
    let transform = run_phase(
        "populating fact and dimension tables",
        "transforms committed",
        populate_warehouse_tables(&mut *session, catalog),
    )
    .await?;
    Ok(EtlSummary { staging, transform })
}

async fn run_phase<F>(label: &str, done: &str, work: F) -> Result<RunStats>
where
    F: Future<Output = WarehouseResult<RunStats>>,
{
    let progress = PhaseProgress::start(label);
    match work.await {
        Ok(stats) => {
            progress.finish_with_message(format!("{done}: {}", stats.summary()));
            Ok(stats)
        }
        Err(err) => {
            progress.abandon();
            Err(err.into())
        }
    }
}
