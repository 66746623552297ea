//! playdwh-warehouse
//!
//! Connection handling and the sequential statement runner for the
//! song-play warehouse.

#![warn(missing_docs)]

mod connection;
mod counts;
mod error;
mod executor;
mod session;

pub use connection::{ConnectOptions, WarehouseClient};
pub use counts::{collect_table_counts, TableCounts};
pub use error::{WarehouseError, WarehouseResult};
pub use executor::{
    create_tables, drop_tables, load_staging_tables, populate_warehouse_tables, run_sequence,
    RunStats, StatementExecutor, PHASE_CREATE, PHASE_DROP, PHASE_LOAD_STAGING, PHASE_TRANSFORM,
};
pub use session::WarehouseSession;
