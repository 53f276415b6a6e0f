//! Promo Codes Service

use async_trait::async_trait;
use athfal::promotions::{PromoCode, normalize_code};
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::promo_codes::{
        errors::PromoCodesServiceError, repository::PgPromoCodesRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgPromoCodesService {
    db: Db,
    repository: PgPromoCodesRepository,
}

impl PgPromoCodesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPromoCodesRepository::new(),
        }
    }
}

#[async_trait]
impl PromoCodesService for PgPromoCodesService {
    #[tracing::instrument(name = "promo_codes.service.list_promo_codes", skip(self), err)]
    async fn list_promo_codes(&self) -> Result<Vec<PromoCode>, PromoCodesServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.repository.list_promo_codes(&mut tx).await?;

        tx.commit().await?;

        records.into_iter().map(PromoCode::try_from).collect()
    }

    #[tracing::instrument(
        name = "promo_codes.service.find_by_code",
        skip(self, code),
        fields(code = tracing::field::Empty),
        err
    )]
    async fn find_by_code(&self, code: String) -> Result<PromoCode, PromoCodesServiceError> {
        let code = normalize_code(&code);

        Span::current().record("code", tracing::field::display(&code));

        let mut tx = self.db.begin().await?;

        let record = self.repository.find_promo_code(&mut tx, &code).await?;

        tx.commit().await?;

        PromoCode::try_from(record)
    }

    #[tracing::instrument(
        name = "promo_codes.service.increment_usage",
        skip(self, code),
        fields(code = tracing::field::Empty, usage_count = tracing::field::Empty),
        err
    )]
    async fn increment_usage(&self, code: String) -> Result<u32, PromoCodesServiceError> {
        let code = normalize_code(&code);
        let span = Span::current();

        span.record("code", tracing::field::display(&code));

        let mut tx = self.db.begin().await?;

        let Some(count) = self.repository.increment_usage(&mut tx, &code).await? else {
            // Distinguish an unknown code from one that is already at its limit.
            self.repository.find_promo_code(&mut tx, &code).await?;

            return Err(PromoCodesServiceError::UsageExhausted);
        };

        tx.commit().await?;

        let count = u32::try_from(count).map_err(|_err| PromoCodesServiceError::InvalidData)?;

        span.record("usage_count", count);

        info!(code = %code, usage_count = count, "incremented promo code usage");

        Ok(count)
    }
}

#[automock]
#[async_trait]
pub trait PromoCodesService: Send + Sync {
    /// Retrieves every promo code.
    async fn list_promo_codes(&self) -> Result<Vec<PromoCode>, PromoCodesServiceError>;

    /// Look up a promo code by customer input, case-insensitively.
    async fn find_by_code(&self, code: String) -> Result<PromoCode, PromoCodesServiceError>;

    /// Record one more use of a code, returning the new usage count.
    async fn increment_usage(&self, code: String) -> Result<u32, PromoCodesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{
        TestContext,
        helpers::{insert_promo_code, usage_count},
    };

    use super::*;

    #[tokio::test]
    async fn find_by_code_ignores_case_and_whitespace() -> TestResult {
        let ctx = TestContext::new().await;

        insert_promo_code(&ctx, "HEMAT10", 10, None, 0).await?;

        let promo = ctx.promo_codes.find_by_code(" hemat10 ".to_string()).await?;

        assert_eq!(promo.code, "HEMAT10");

        Ok(())
    }

    #[tokio::test]
    async fn increment_usage_stops_at_limit() -> TestResult {
        let ctx = TestContext::new().await;

        insert_promo_code(&ctx, "LAST2", 15, Some(2), 1).await?;

        assert_eq!(
            ctx.promo_codes.increment_usage("last2".to_string()).await?,
            2
        );

        let result = ctx.promo_codes.increment_usage("LAST2".to_string()).await;

        assert!(
            matches!(result, Err(PromoCodesServiceError::UsageExhausted)),
            "expected UsageExhausted, got {result:?}"
        );
        assert_eq!(usage_count(&ctx, "LAST2").await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_increments_never_pass_limit() -> TestResult {
        let ctx = TestContext::new().await;

        insert_promo_code(&ctx, "FLASH", 50, Some(3), 0).await?;

        let increment = || ctx.promo_codes.increment_usage("FLASH".to_string());

        let (a, b, c, d, e) = tokio::join!(
            increment(),
            increment(),
            increment(),
            increment(),
            increment()
        );
        let results = [a, b, c, d, e];

        let granted = results.iter().filter(|result| result.is_ok()).count();
        let exhausted = results
            .iter()
            .filter(|result| matches!(result, Err(PromoCodesServiceError::UsageExhausted)))
            .count();

        assert_eq!(granted, 3);
        assert_eq!(exhausted, 2);
        assert_eq!(usage_count(&ctx, "FLASH").await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn increment_unknown_code_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.promo_codes.increment_usage("NOPE".to_string()).await;

        assert!(
            matches!(result, Err(PromoCodesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
