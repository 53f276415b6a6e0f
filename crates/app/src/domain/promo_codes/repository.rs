//! Promo Codes Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{database::try_get_count, domain::promo_codes::records::PromoCodeRecord};

const LIST_PROMO_CODES_SQL: &str = include_str!("sql/list_promo_codes.sql");
const FIND_PROMO_CODE_SQL: &str = include_str!("sql/find_promo_code.sql");
const INCREMENT_USAGE_SQL: &str = include_str!("sql/increment_usage.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromoCodesRepository;

impl PgPromoCodesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_promo_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<PromoCodeRecord>, sqlx::Error> {
        query_as::<Postgres, PromoCodeRecord>(LIST_PROMO_CODES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<PromoCodeRecord, sqlx::Error> {
        query_as::<Postgres, PromoCodeRecord>(FIND_PROMO_CODE_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    /// Returns `None` when the code is unknown or already at its limit.
    pub(crate) async fn increment_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<i32>, sqlx::Error> {
        query_scalar::<Postgres, i32>(INCREMENT_USAGE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }
}

fn try_get_optional_count(row: &PgRow, column: &str) -> Result<Option<u32>, sqlx::Error> {
    row.try_get::<Option<i32>, _>(column)?
        .map(u32::try_from)
        .transpose()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

impl<'r> FromRow<'r, PgRow> for PromoCodeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            code: row.try_get("code")?,
            discount_percentage: try_get_count(row, "discount_percentage")?,
            is_active: row.try_get("is_active")?,
            valid_from: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_from")?
                .map(SqlxTimestamp::to_jiff),
            valid_until: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_until")?
                .map(SqlxTimestamp::to_jiff),
            usage_limit: try_get_optional_count(row, "usage_limit")?,
            usage_count: try_get_count(row, "usage_count")?,
            applicable_product_ids: row.try_get("applicable_product_ids")?,
            applicable_categories: row.try_get("applicable_categories")?,
        })
    }
}
