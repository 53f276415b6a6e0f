//! Promo Code Fixtures

use jiff::Timestamp;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, parse_percent_points},
    promotions::{DiscountPercentage, PromoCode, PromoScope},
};

/// Wrapper for promo codes in YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromoCodesFixture {
    /// Promo codes, in listing order
    pub promo_codes: Vec<PromoCodeFixture>,
}

/// Promo Code Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromoCodeFixture {
    /// Code customers type in
    pub code: String,

    /// Discount (e.g., "10%")
    pub discount: String,

    /// Whether the code is switched on
    #[serde(default = "default_active")]
    pub active: bool,

    /// Start of the validity window
    #[serde(default)]
    pub valid_from: Option<Timestamp>,

    /// End of the validity window
    #[serde(default)]
    pub valid_until: Option<Timestamp>,

    /// Maximum uses
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Uses so far
    #[serde(default)]
    pub usage_count: u32,

    /// Applicability scope
    #[serde(default)]
    pub scope: PromoScope,
}

const fn default_active() -> bool {
    true
}

impl TryFrom<PromoCodeFixture> for PromoCode {
    type Error = FixtureError;

    fn try_from(fixture: PromoCodeFixture) -> Result<Self, Self::Error> {
        let points = parse_percent_points(&fixture.discount)?;

        // Discounts are whole percentages.
        let whole = if points.fract().is_zero() {
            points.to_u32()
        } else {
            None
        }
        .ok_or_else(|| FixtureError::InvalidPercentage(fixture.discount.clone()))?;

        let promo = PromoCode::new(&fixture.code, DiscountPercentage::new(whole)?)
            .with_window(fixture.valid_from, fixture.valid_until)?
            .with_usage(fixture.usage_limit, fixture.usage_count)
            .with_scope(fixture.scope)
            .with_active(fixture.active);

        Ok(promo)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::products::ProductCategory;

    use super::*;

    #[test]
    fn converts_restricted_promo() -> TestResult {
        let fixture: PromoCodeFixture = serde_norway::from_str(
            r"
code: merch25
discount: 25%
usage_limit: 50
usage_count: 3
scope:
  type: restricted
  categories: [merchandise]
",
        )?;

        let promo = PromoCode::try_from(fixture)?;

        assert_eq!(promo.code, "MERCH25");
        assert_eq!(promo.discount.points(), 25);
        assert_eq!(promo.usage_limit, Some(50));
        assert_eq!(promo.scope, PromoScope::categories([ProductCategory::Merchandise]));

        Ok(())
    }

    #[test]
    fn rejects_fractional_discount() -> TestResult {
        let fixture: PromoCodeFixture =
            serde_norway::from_str("code: HALF\ndiscount: 12.5%\n")?;

        assert!(matches!(
            PromoCode::try_from(fixture),
            Err(FixtureError::InvalidPercentage(_))
        ));

        Ok(())
    }

    #[test]
    fn rejects_inverted_window() -> TestResult {
        let fixture: PromoCodeFixture = serde_norway::from_str(
            "code: LATE\ndiscount: 5%\nvalid_from: 2026-02-01T00:00:00Z\nvalid_until: 2026-01-01T00:00:00Z\n",
        )?;

        assert!(matches!(
            PromoCode::try_from(fixture),
            Err(FixtureError::Promotion(_))
        ));

        Ok(())
    }
}
