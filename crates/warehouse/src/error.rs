//! Error types for warehouse operations.

use playdwh_core::WarehouseTable;
use thiserror::Error;

/// Errors that can occur while driving the warehouse.
#[derive(Error, Debug)]
pub enum WarehouseError {
    /// Failed to open a connection to the cluster
    #[error("Failed to connect to warehouse: {0}")]
    Connect(#[source] sqlx::Error),

    /// Opening the transaction for a statement failed
    #[error("Failed to open transaction before {table} statement: {source}")]
    Begin {
        /// Table the pending statement targeted
        table: WarehouseTable,
        /// Error reported by the server
        source: sqlx::Error,
    },

    /// A catalog statement failed; the run stops here
    #[error("Statement against {table} failed: {source}")]
    Statement {
        /// Table the failing statement targeted
        table: WarehouseTable,
        /// Error reported by the server
        source: sqlx::Error,
    },

    /// A commit failed after its statement succeeded
    #[error("Commit failed: {0}")]
    Commit(#[source] sqlx::Error),

    /// A row-count query failed
    #[error("Count query against {table} failed: {source}")]
    Count {
        /// Table being counted
        table: WarehouseTable,
        /// Error reported by the server
        source: sqlx::Error,
    },
}

/// Result type for warehouse operations.
pub type WarehouseResult<T> = Result<T, WarehouseError>;
