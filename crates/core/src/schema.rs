//! Warehouse table definitions and DDL rendering.
//!
//! The schema is a star layout fed by two staging tables:
//!
//! - `staging_events`, `staging_songs` (raw landing zone for bulk loads)
//! - `songplays` (fact)
//! - `users`, `songs`, `artists`, `time` (dimensions)
//!
//! DDL is rendered per [`SqlDialect`]: Redshift gets identity columns and
//! distribution/sort keys, Postgres gets the portable equivalents.

use std::fmt;

use crate::dialect::SqlDialect;

/// The seven tables managed by the loader, in canonical order.
///
/// Canonical order is the order drop and create statements run in:
/// staging tables first, then the fact table, then dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarehouseTable {
    /// Raw event-log landing table
    StagingEvents,
    /// Raw song-metadata landing table
    StagingSongs,
    /// Fact table of song plays
    Songplays,
    /// User dimension
    Users,
    /// Song dimension
    Songs,
    /// Artist dimension
    Artists,
    /// Timestamp-breakdown dimension
    Time,
}

impl WarehouseTable {
    /// All tables in canonical order.
    pub const ALL: [WarehouseTable; 7] = [
        WarehouseTable::StagingEvents,
        WarehouseTable::StagingSongs,
        WarehouseTable::Songplays,
        WarehouseTable::Users,
        WarehouseTable::Songs,
        WarehouseTable::Artists,
        WarehouseTable::Time,
    ];

    /// The table name as it appears in SQL.
    pub fn name(self) -> &'static str {
        match self {
            WarehouseTable::StagingEvents => "staging_events",
            WarehouseTable::StagingSongs => "staging_songs",
            WarehouseTable::Songplays => "songplays",
            WarehouseTable::Users => "users",
            WarehouseTable::Songs => "songs",
            WarehouseTable::Artists => "artists",
            WarehouseTable::Time => "time",
        }
    }
}

impl fmt::Display for WarehouseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub(crate) fn drop_table_sql(table: WarehouseTable) -> String {
    format!("DROP TABLE IF EXISTS {}", table.name())
}

pub(crate) fn create_table_sql(table: WarehouseTable, dialect: SqlDialect) -> String {
    match table {
        WarehouseTable::StagingEvents => staging_events_sql(),
        WarehouseTable::StagingSongs => staging_songs_sql(),
        WarehouseTable::Songplays => songplays_sql(dialect),
        WarehouseTable::Users => users_sql(dialect),
        WarehouseTable::Songs => songs_sql(dialect),
        WarehouseTable::Artists => artists_sql(dialect),
        WarehouseTable::Time => time_sql(dialect),
    }
}

fn staging_events_sql() -> String {
    r#"CREATE TABLE IF NOT EXISTS staging_events (
    artist_name TEXT,
    auth TEXT,
    first_name TEXT,
    gender TEXT,
    itemsession INT,
    last_name TEXT,
    length NUMERIC,
    level TEXT,
    location TEXT,
    method TEXT,
    page TEXT,
    registration BIGINT,
    session_id INT,
    song TEXT,
    status INT,
    ts BIGINT,
    user_agent TEXT,
    user_id INT
)"#
    .to_string()
}

fn staging_songs_sql() -> String {
    r#"CREATE TABLE IF NOT EXISTS staging_songs (
    num_songs INT,
    artist_id TEXT,
    artist_latitude TEXT,
    artist_longitude TEXT,
    artist_location TEXT,
    artist_name TEXT,
    song_id TEXT,
    title TEXT,
    duration NUMERIC,
    year INT
)"#
    .to_string()
}

fn songplays_sql(dialect: SqlDialect) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS songplays (
    songplay_id {identity} PRIMARY KEY,
    start_time TIMESTAMP NOT NULL{sortkey},
    user_id BIGINT NOT NULL,
    level TEXT,
    song_id TEXT,
    artist_id TEXT,
    session_id INT,
    location TEXT,
    user_agent TEXT
){attributes}"#,
        identity = dialect.identity_bigint(),
        sortkey = dialect.sortkey(),
        attributes = dialect.table_attributes(" DISTSTYLE KEY DISTKEY(user_id)"),
    )
}

fn users_sql(dialect: SqlDialect) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS users (
    user_id INT PRIMARY KEY,
    first_name TEXT,
    last_name TEXT,
    gender TEXT,
    level TEXT
){attributes}"#,
        attributes = dialect.table_attributes(" DISTSTYLE ALL"),
    )
}

fn songs_sql(dialect: SqlDialect) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS songs (
    song_id TEXT PRIMARY KEY,
    title TEXT,
    artist_id TEXT NOT NULL,
    year INT,
    duration NUMERIC
){attributes}"#,
        attributes = dialect.table_attributes(" DISTSTYLE ALL"),
    )
}

fn artists_sql(dialect: SqlDialect) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS artists (
    artist_id TEXT PRIMARY KEY,
    name TEXT,
    location TEXT,
    latitude TEXT,
    longitude TEXT
){attributes}"#,
        attributes = dialect.table_attributes(" DISTSTYLE ALL"),
    )
}

fn time_sql(dialect: SqlDialect) -> String {
    format!(
        r#"CREATE TABLE IF NOT EXISTS time (
    start_time TIMESTAMP PRIMARY KEY{sortkey},
    hour INT,
    day INT,
    week INT,
    month INT,
    year INT,
    weekday INT
){attributes}"#,
        sortkey = dialect.sortkey(),
        attributes = dialect.table_attributes(" DISTSTYLE ALL"),
    )
}
