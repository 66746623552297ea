//! The statement catalog: every SQL statement the loader runs, in order.
//!
//! A [`QueryCatalog`] is rendered once from configuration at startup and is
//! immutable afterwards. It holds four sequences:
//!
//! - drop statements (all seven tables)
//! - create statements (all seven tables)
//! - copy statements (bulk loads into the two staging tables)
//! - insert statements (staging-to-star transforms)
//!
//! Each sequence is handed out as a slice in execution order. Configuration
//! values land in statement text only through a quoting renderer, so a quote
//! in a path or role ARN cannot break out of its literal.

use crate::config::EtlConfig;
use crate::dialect::SqlDialect;
use crate::schema::{self, WarehouseTable};

/// A single SQL statement bound to the table it targets.
#[derive(Debug, Clone)]
pub struct Statement {
    table: WarehouseTable,
    sql: String,
}

impl Statement {
    fn new(table: WarehouseTable, sql: String) -> Self {
        Statement { table, sql }
    }

    /// Table this statement targets (used for logs and error context).
    pub fn table(&self) -> WarehouseTable {
        self.table
    }

    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// Parameters baked into one staging-table bulk load.
#[derive(Debug, Clone)]
struct CopyParams<'a> {
    /// Object-store prefix the warehouse reads from
    source: &'a str,
    /// IAM role ARN the warehouse assumes for the read
    iam_role: &'a str,
    /// Column-mapping mode for the JSON payload
    mapping: JsonMapping<'a>,
    /// Region the source bucket lives in
    region: &'a str,
}

/// How a bulk load maps JSON fields onto staging columns.
#[derive(Debug, Clone)]
enum JsonMapping<'a> {
    /// Match JSON keys to column names
    Auto,
    /// Use the jsonpaths file at the given object-store path
    Paths(&'a str),
}

/// Renders a string as a single-quoted SQL literal, doubling embedded quotes.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn copy_sql(table: WarehouseTable, params: &CopyParams<'_>) -> String {
    let mapping = match params.mapping {
        JsonMapping::Auto => quote_literal("auto"),
        JsonMapping::Paths(path) => quote_literal(path),
    };
    format!(
        r#"COPY {table}
FROM {source}
CREDENTIALS {credentials}
FORMAT AS JSON {mapping}
REGION {region}"#,
        table = table.name(),
        source = quote_literal(params.source),
        credentials = quote_literal(&format!("aws_iam_role={}", params.iam_role)),
        mapping = mapping,
        region = quote_literal(params.region),
    )
}

fn songplays_insert_sql() -> String {
    r#"INSERT INTO songplays (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
SELECT DISTINCT
    TIMESTAMP 'epoch' + se.ts / 1000 * INTERVAL '1 second' AS start_time,
    se.user_id,
    se.level,
    ss.song_id,
    ss.artist_id,
    se.session_id,
    se.location,
    se.user_agent
FROM staging_events AS se
JOIN staging_songs AS ss ON se.song = ss.title
WHERE se.page = 'NextSong'"#
        .to_string()
}

fn users_insert_sql() -> String {
    r#"INSERT INTO users (user_id, first_name, last_name, gender, level)
SELECT DISTINCT
    user_id,
    first_name,
    last_name,
    gender,
    level
FROM staging_events
WHERE page = 'NextSong'"#
        .to_string()
}

fn songs_insert_sql() -> String {
    r#"INSERT INTO songs (song_id, title, artist_id, year, duration)
SELECT DISTINCT
    song_id,
    title,
    artist_id,
    year,
    duration
FROM staging_songs"#
        .to_string()
}

fn artists_insert_sql() -> String {
    r#"INSERT INTO artists (artist_id, name, location, latitude, longitude)
SELECT DISTINCT
    artist_id,
    artist_name,
    artist_location,
    artist_latitude,
    artist_longitude
FROM staging_songs"#
        .to_string()
}

// The calendar fields come from a derived table rather than a lateral alias
// reference, which Redshift accepts but Postgres rejects.
fn time_insert_sql(dialect: SqlDialect) -> String {
    format!(
        r#"INSERT INTO time (start_time, hour, day, week, month, year, weekday)
SELECT DISTINCT
    start_time,
    EXTRACT(hour FROM start_time),
    EXTRACT(day FROM start_time),
    EXTRACT(week FROM start_time),
    EXTRACT(month FROM start_time),
    EXTRACT(year FROM start_time),
    EXTRACT({weekday} FROM start_time)
FROM (
    SELECT TIMESTAMP 'epoch' + ts / 1000 * INTERVAL '1 second' AS start_time
    FROM staging_events
    WHERE page = 'NextSong'
) AS event_times"#,
        weekday = dialect.weekday_field(),
    )
}

/// Every statement the loader can run, rendered once at construction.
#[derive(Debug, Clone)]
pub struct QueryCatalog {
    dialect: SqlDialect,
    drop_statements: Vec<Statement>,
    create_statements: Vec<Statement>,
    copy_statements: Vec<Statement>,
    insert_statements: Vec<Statement>,
}

impl QueryCatalog {
    /// Renders the full catalog for `dialect` from the given configuration.
    pub fn new(config: &EtlConfig, dialect: SqlDialect) -> Self {
        let drop_statements = WarehouseTable::ALL
            .iter()
            .map(|&table| Statement::new(table, schema::drop_table_sql(table)))
            .collect();

        let create_statements = WarehouseTable::ALL
            .iter()
            .map(|&table| Statement::new(table, schema::create_table_sql(table, dialect)))
            .collect();

        let copy_statements = vec![
            Statement::new(
                WarehouseTable::StagingEvents,
                copy_sql(
                    WarehouseTable::StagingEvents,
                    &CopyParams {
                        source: &config.s3.log_data,
                        iam_role: &config.iam_role.arn,
                        mapping: JsonMapping::Paths(&config.s3.log_jsonpath),
                        region: &config.s3.region,
                    },
                ),
            ),
            Statement::new(
                WarehouseTable::StagingSongs,
                copy_sql(
                    WarehouseTable::StagingSongs,
                    &CopyParams {
                        source: &config.s3.song_data,
                        iam_role: &config.iam_role.arn,
                        mapping: JsonMapping::Auto,
                        region: &config.s3.region,
                    },
                ),
            ),
        ];

        let insert_statements = vec![
            Statement::new(WarehouseTable::Songplays, songplays_insert_sql()),
            Statement::new(WarehouseTable::Users, users_insert_sql()),
            Statement::new(WarehouseTable::Songs, songs_insert_sql()),
            Statement::new(WarehouseTable::Artists, artists_insert_sql()),
            Statement::new(WarehouseTable::Time, time_insert_sql(dialect)),
        ];

        QueryCatalog {
            dialect,
            drop_statements,
            create_statements,
            copy_statements,
            insert_statements,
        }
    }

    /// Dialect the catalog was rendered for.
    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Drop statements for all seven tables, in canonical order.
    pub fn drop_statements(&self) -> &[Statement] {
        &self.drop_statements
    }

    /// Create statements for all seven tables, in canonical order.
    pub fn create_statements(&self) -> &[Statement] {
        &self.create_statements
    }

    /// Bulk-load statements: events first, then songs.
    pub fn copy_statements(&self) -> &[Statement] {
        &self.copy_statements
    }

    /// Staging-to-star transforms: fact table first, then dimensions.
    pub fn insert_statements(&self) -> &[Statement] {
        &self.insert_statements
    }
}
