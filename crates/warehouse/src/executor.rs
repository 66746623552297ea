//! The sequential statement runner.
//!
//! Statements run strictly in catalog order on one session. Each successful
//! statement is committed before the next one starts, so a failure partway
//! through leaves every earlier statement durable and every later statement
//! untouched. The first failure stops the run.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use playdwh_core::{QueryCatalog, Statement};
use playdwh_observability as obs;
use tracing::{debug, info};

use crate::error::WarehouseResult;

/// Phase label for schema teardown.
pub const PHASE_DROP: &str = "drop-tables";
/// Phase label for schema creation.
pub const PHASE_CREATE: &str = "create-tables";
/// Phase label for staging bulk loads.
pub const PHASE_LOAD_STAGING: &str = "load-staging";
/// Phase label for star-schema transforms.
pub const PHASE_TRANSFORM: &str = "transform";

/// Seam between the statement runner and the connection it drives.
#[async_trait]
pub trait StatementExecutor {
    /// Runs one statement inside the session's transaction, opening one if
    /// none is open.
    async fn execute(&mut self, statement: &Statement) -> WarehouseResult<()>;

    /// Commits the open transaction.
    async fn commit(&mut self) -> WarehouseResult<()>;
}

/// Counters for one finished run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    /// Statements executed successfully
    pub statements_executed: usize,
    /// Commits issued, one per statement
    pub commits_issued: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl RunStats {
    /// One-line summary for operator output.
    pub fn summary(&self) -> String {
        format!(
            "{} statements committed in {:.1}s",
            self.statements_executed,
            self.elapsed.as_secs_f64()
        )
    }

    fn merge(self, other: RunStats) -> RunStats {
        RunStats {
            statements_executed: self.statements_executed + other.statements_executed,
            commits_issued: self.commits_issued + other.commits_issued,
            elapsed: self.elapsed + other.elapsed,
        }
    }
}

/// Runs `statements` in order on `executor`, committing after each one.
pub async fn run_sequence<E>(
    executor: &mut E,
    phase: &str,
    statements: &[Statement],
) -> WarehouseResult<RunStats>
where
    E: StatementExecutor + ?Sized,
{
    let started = Instant::now();
    let mut stats = RunStats::default();
    for statement in statements {
        let table = statement.table().name();
        debug!(phase, table, "executing statement");
        let statement_started = Instant::now();
        if let Err(err) = executor.execute(statement).await {
            obs::record_statement_failure(phase, table, &err.to_string());
            return Err(err);
        }
        if let Err(err) = executor.commit().await {
            obs::record_statement_failure(phase, table, &err.to_string());
            return Err(err);
        }
        obs::record_statement_latency(phase, table, statement_started.elapsed());
        stats.statements_executed += 1;
        stats.commits_issued += 1;
        info!(phase, table, "statement committed");
    }
    stats.elapsed = started.elapsed();
    obs::record_sequence_elapsed(phase, stats.statements_executed, stats.elapsed);
    Ok(stats)
}

/// Drops all seven tables.
pub async fn drop_tables<E>(executor: &mut E, catalog: &QueryCatalog) -> WarehouseResult<RunStats>
where
    E: StatementExecutor + ?Sized,
{
    run_sequence(executor, PHASE_DROP, catalog.drop_statements()).await
}

/// Drops and recreates all seven tables.
pub async fn create_tables<E>(executor: &mut E, catalog: &QueryCatalog) -> WarehouseResult<RunStats>
where
    E: StatementExecutor + ?Sized,
{
    let dropped = drop_tables(executor, catalog).await?;
    let created = run_sequence(executor, PHASE_CREATE, catalog.create_statements()).await?;
    Ok(dropped.merge(created))
}

/// Bulk-loads the staging tables from object storage.
pub async fn load_staging_tables<E>(
    executor: &mut E,
    catalog: &QueryCatalog,
) -> WarehouseResult<RunStats>
where
    E: StatementExecutor + ?Sized,
{
    run_sequence(executor, PHASE_LOAD_STAGING, catalog.copy_statements()).await
}

/// Populates the fact and dimension tables from staging.
pub async fn populate_warehouse_tables<E>(
    executor: &mut E,
    catalog: &QueryCatalog,
) -> WarehouseResult<RunStats>
where
    E: StatementExecutor + ?Sized,
{
    run_sequence(executor, PHASE_TRANSFORM, catalog.insert_statements()).await
}
