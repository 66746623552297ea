//! The single-connection session statements run on.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use playdwh_core::{Statement, WarehouseTable};
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgQueryResult;
use sqlx::{Executor, Postgres};
use tracing::trace;

use crate::error::{WarehouseError, WarehouseResult};
use crate::executor::StatementExecutor;

/// One warehouse connection plus its transaction state.
///
/// `execute` opens a transaction if none is open and `commit` closes it, so
/// every committed statement is its own transaction. A failed statement
/// leaves its aborted transaction on the connection; callers abandon the
/// session and the connection closes with the client.
pub struct WarehouseSession {
    conn: PoolConnection<Postgres>,
    in_txn: bool,
}

impl WarehouseSession {
    pub(crate) fn new(conn: PoolConnection<Postgres>) -> Self {
        Self {
            conn,
            in_txn: false,
        }
    }

    /// Runs one SQL string on the connection. raw_sql uses the simple query
    /// protocol; COPY and DDL cannot go through the prepared-statement path
    /// on Redshift. A plain fn returning sqlx's type-erased future: solving
    /// the `Executor` obligation inside the `async_trait`-boxed bodies trips
    /// rustc's "implementation of `Executor` is not general enough"
    /// limitation, so it is solved here and only the boxed future crosses
    /// the awaits.
    fn run_raw<'a>(
        &'a mut self,
        sql: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<PgQueryResult, sqlx::Error>> + Send + 'a>> {
        (&mut *self.conn).execute(sqlx::raw_sql(sql))
    }

    /// Counts the rows of `table`. Runs in autocommit, not inside a
    /// statement transaction.
    pub async fn count_rows(&mut self, table: WarehouseTable) -> WarehouseResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|source| WarehouseError::Count { table, source })
    }
}

#[async_trait]
impl StatementExecutor for WarehouseSession {
    async fn execute(&mut self, statement: &Statement) -> WarehouseResult<()> {
        if !self.in_txn {
            self.run_raw("BEGIN")
                .await
                .map_err(|source| WarehouseError::Begin {
                    table: statement.table(),
                    source,
                })?;
            self.in_txn = true;
        }
        trace!(table = %statement.table(), "executing statement");
        self.run_raw(statement.sql())
            .await
            .map_err(|source| WarehouseError::Statement {
                table: statement.table(),
                source,
            })?;
        Ok(())
    }

    async fn commit(&mut self) -> WarehouseResult<()> {
        self.run_raw("COMMIT")
            .await
            .map_err(WarehouseError::Commit)?;
        self.in_txn = false;
        Ok(())
    }
}
