//! Database connection management

use std::num::TryFromIntError;

use athfal::currency::Rupiah;
use sqlx::{PgPool, Postgres, Row, Transaction, migrate::MigrateError, postgres::PgRow};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when starting the transaction fails.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Read a non-negative `BIGINT` amount column.
pub(crate) fn try_get_amount(row: &PgRow, column: &str) -> Result<Rupiah, sqlx::Error> {
    let value: i64 = row.try_get(column)?;

    u64::try_from(value)
        .map(Rupiah::new)
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

/// Read a non-negative `INTEGER` count column.
pub(crate) fn try_get_count(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i32 = row.try_get(column)?;

    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// A value too large for the column it is bound to.
#[derive(Debug, Error)]
#[error("value for column `{column}` is out of range")]
pub(crate) struct ParamOutOfRange {
    column: String,

    #[source]
    source: TryFromIntError,
}

fn out_of_range(column: &str) -> impl FnOnce(TryFromIntError) -> sqlx::Error + '_ {
    move |source| {
        sqlx::Error::Encode(Box::new(ParamOutOfRange {
            column: column.to_string(),
            source,
        }))
    }
}

/// Convert an amount for binding to a `BIGINT` column.
pub(crate) fn amount_param(column: &str, amount: Rupiah) -> Result<i64, sqlx::Error> {
    i64::try_from(amount.value()).map_err(out_of_range(column))
}

/// Convert a count for binding to an `INTEGER` column.
pub(crate) fn count_param(column: &str, count: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(count).map_err(out_of_range(column))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn amount_param_rejects_values_beyond_bigint() -> TestResult {
        let error = match amount_param("total", Rupiah::new(u64::MAX)) {
            Err(sqlx::Error::Encode(error)) => error,
            other => return Err(format!("expected an encode error, got {other:?}").into()),
        };

        assert_eq!(error.to_string(), "value for column `total` is out of range");

        Ok(())
    }

    #[test]
    fn count_param_rejects_values_beyond_integer() {
        assert!(matches!(
            count_param("quantity", u32::MAX),
            Err(sqlx::Error::Encode(_))
        ));
    }

    #[test]
    fn count_param_accepts_small_counts() {
        assert!(matches!(count_param("quantity", 3), Ok(3)));
    }
}
