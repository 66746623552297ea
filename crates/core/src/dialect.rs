//! SQL dialect selection for the target warehouse engine.

use std::fmt;

/// Target engine for generated SQL.
///
/// Redshift is the primary target. The Postgres dialect renders the same
/// schema without Redshift-specific storage attributes so the full pipeline
/// can also run against a stock PostgreSQL server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    /// Amazon Redshift (identity columns, distribution and sort keys)
    Redshift,
    /// Stock PostgreSQL (local development and integration tests)
    Postgres,
}

impl SqlDialect {
    /// Column type for an auto-incrementing BIGINT surrogate key.
    pub(crate) fn identity_bigint(self) -> &'static str {
        match self {
            SqlDialect::Redshift => "BIGINT IDENTITY(0,1)",
            SqlDialect::Postgres => "BIGINT GENERATED BY DEFAULT AS IDENTITY",
        }
    }

    /// Column suffix marking the table sort key, where the engine has one.
    pub(crate) fn sortkey(self) -> &'static str {
        match self {
            SqlDialect::Redshift => " SORTKEY",
            SqlDialect::Postgres => "",
        }
    }

    /// Table-level storage attributes (distribution style), where supported.
    pub(crate) fn table_attributes(self, redshift_attributes: &'static str) -> &'static str {
        match self {
            SqlDialect::Redshift => redshift_attributes,
            SqlDialect::Postgres => "",
        }
    }

    /// Field name `EXTRACT` uses for day-of-week on this engine.
    pub(crate) fn weekday_field(self) -> &'static str {
        match self {
            SqlDialect::Redshift => "weekday",
            SqlDialect::Postgres => "dow",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Redshift => write!(f, "redshift"),
            SqlDialect::Postgres => write!(f, "postgres"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_column_per_dialect() {
        assert_eq!(SqlDialect::Redshift.identity_bigint(), "BIGINT IDENTITY(0,1)");
        assert_eq!(
            SqlDialect::Postgres.identity_bigint(),
            "BIGINT GENERATED BY DEFAULT AS IDENTITY"
        );
    }

    #[test]
    fn test_postgres_drops_storage_attributes() {
        assert_eq!(SqlDialect::Postgres.sortkey(), "");
        assert_eq!(SqlDialect::Postgres.table_attributes(" DISTSTYLE ALL"), "");
        assert_eq!(
            SqlDialect::Redshift.table_attributes(" DISTSTYLE ALL"),
            " DISTSTYLE ALL"
        );
    }

    #[test]
    fn test_weekday_field_per_dialect() {
        assert_eq!(SqlDialect::Redshift.weekday_field(), "weekday");
        assert_eq!(SqlDialect::Postgres.weekday_field(), "dow");
    }
}
