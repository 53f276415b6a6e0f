//! Promo Code Records

use athfal::{
    products::{ProductCategory, ProductError, ProductId},
    promotions::{DiscountPercentage, PromoCode, PromoScope},
};
use jiff::Timestamp;

use crate::domain::promo_codes::errors::PromoCodesServiceError;

/// Promo Code Record
#[derive(Debug, Clone)]
pub struct PromoCodeRecord {
    pub code: String,
    pub discount_percentage: u32,
    pub is_active: bool,
    pub valid_from: Option<Timestamp>,
    pub valid_until: Option<Timestamp>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub applicable_product_ids: Vec<String>,
    pub applicable_categories: Vec<String>,
}

impl PromoCodeRecord {
    /// Empty restriction lists mean the code applies to every product.
    fn scope(&self) -> Result<PromoScope, PromoCodesServiceError> {
        if self.applicable_product_ids.is_empty() && self.applicable_categories.is_empty() {
            return Ok(PromoScope::AllProducts);
        }

        let categories = self
            .applicable_categories
            .iter()
            .map(|slug| slug.parse::<ProductCategory>())
            .collect::<Result<_, ProductError>>()?;

        Ok(PromoScope::Restricted {
            product_ids: self
                .applicable_product_ids
                .iter()
                .map(|id| ProductId::from(id.as_str()))
                .collect(),
            categories,
        })
    }
}

impl TryFrom<PromoCodeRecord> for PromoCode {
    type Error = PromoCodesServiceError;

    fn try_from(record: PromoCodeRecord) -> Result<Self, Self::Error> {
        let scope = record.scope()?;

        let promo = PromoCode::new(
            &record.code,
            DiscountPercentage::new(record.discount_percentage)?,
        )
        .with_window(record.valid_from, record.valid_until)?
        .with_usage(record.usage_limit, record.usage_count)
        .with_scope(scope)
        .with_active(record.is_active);

        Ok(promo)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn record() -> PromoCodeRecord {
        PromoCodeRecord {
            code: "MERCH25".to_string(),
            discount_percentage: 25,
            is_active: true,
            valid_from: None,
            valid_until: None,
            usage_limit: Some(10),
            usage_count: 2,
            applicable_product_ids: Vec::new(),
            applicable_categories: Vec::new(),
        }
    }

    #[test]
    fn empty_restrictions_apply_to_all_products() -> TestResult {
        let promo = PromoCode::try_from(record())?;

        assert_eq!(promo.scope, PromoScope::AllProducts);
        assert_eq!(promo.usage_limit, Some(10));

        Ok(())
    }

    #[test]
    fn category_restrictions_are_parsed() -> TestResult {
        let promo = PromoCode::try_from(PromoCodeRecord {
            applicable_categories: vec!["merchandise".to_string()],
            ..record()
        })?;

        assert_eq!(
            promo.scope,
            PromoScope::categories([ProductCategory::Merchandise])
        );

        Ok(())
    }

    #[test]
    fn unknown_category_is_rejected() {
        let result = PromoCode::try_from(PromoCodeRecord {
            applicable_categories: vec!["toys".to_string()],
            ..record()
        });

        assert!(matches!(result, Err(PromoCodesServiceError::InvalidScope(_))));
    }

    #[test]
    fn zero_discount_is_rejected() {
        let result = PromoCode::try_from(PromoCodeRecord {
            discount_percentage: 0,
            ..record()
        });

        assert!(matches!(
            result,
            Err(PromoCodesServiceError::InvalidPromotion(_))
        ));
    }
}
