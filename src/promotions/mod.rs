//! Promotions
//!
//! Percentage promo codes entered at checkout, and the rules deciding whether one may reduce
//! an order's total.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::products::{Product, ProductCategory, ProductId};

pub mod validation;

/// Errors raised while constructing promo values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromotionError {
    /// Discount outside of `1..=100` percent.
    #[error("discount percentage must be between 1 and 100, got {0}")]
    InvalidDiscount(u32),

    /// Validity window ends before it starts.
    #[error("validity window ends before it starts")]
    InvertedWindow,
}

/// Whole-number discount percentage between 1 and 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DiscountPercentage(u8);

impl DiscountPercentage {
    /// Create a discount percentage.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvalidDiscount`] when outside `1..=100`.
    pub fn new(points: u32) -> Result<Self, PromotionError> {
        match u8::try_from(points) {
            Ok(value @ 1..=100) => Ok(Self(value)),
            _ => Err(PromotionError::InvalidDiscount(points)),
        }
    }

    /// Percentage points of the discount.
    pub const fn points(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for DiscountPercentage {
    type Error = PromotionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercentage> for u32 {
    fn from(value: DiscountPercentage) -> Self {
        u32::from(value.0)
    }
}

impl fmt::Display for DiscountPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Which products a promo code may discount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum PromoScope {
    /// Every product in the cart
    #[default]
    AllProducts,

    /// Only listed products, or products in listed categories
    Restricted {
        /// Products the promo applies to
        #[serde(default)]
        product_ids: SmallVec<[ProductId; 4]>,

        /// Categories the promo applies to
        #[serde(default)]
        categories: SmallVec<[ProductCategory; 2]>,
    },
}

impl PromoScope {
    /// Scope limited to the given categories.
    pub fn categories(categories: impl IntoIterator<Item = ProductCategory>) -> Self {
        PromoScope::Restricted {
            product_ids: SmallVec::new(),
            categories: categories.into_iter().collect(),
        }
    }

    /// Scope limited to the given products.
    pub fn products<I, P>(ids: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        PromoScope::Restricted {
            product_ids: ids.into_iter().map(Into::into).collect(),
            categories: SmallVec::new(),
        }
    }

    /// Whether a product falls inside this scope.
    pub fn applies_to(&self, product: &Product) -> bool {
        match self {
            PromoScope::AllProducts => true,
            PromoScope::Restricted {
                product_ids,
                categories,
            } => product_ids.contains(&product.id) || categories.contains(&product.category),
        }
    }
}

/// Promo code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromoCode {
    /// Upper-cased code customers type in
    pub code: String,

    /// Percentage taken off eligible lines
    pub discount: DiscountPercentage,

    /// Administrative on/off switch
    #[serde(default = "default_active")]
    pub is_active: bool,

    /// Earliest instant the code may be used
    #[serde(default)]
    pub valid_from: Option<Timestamp>,

    /// Latest instant the code may be used
    #[serde(default)]
    pub valid_until: Option<Timestamp>,

    /// Maximum number of orders that may use the code
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Orders that have used the code so far
    #[serde(default)]
    pub usage_count: u32,

    /// Products the discount applies to
    #[serde(default)]
    pub scope: PromoScope,
}

const fn default_active() -> bool {
    true
}

impl PromoCode {
    /// Create an active, unlimited, all-products promo code.
    pub fn new(code: &str, discount: DiscountPercentage) -> Self {
        Self {
            code: normalize_code(code),
            discount,
            is_active: true,
            valid_from: None,
            valid_until: None,
            usage_limit: None,
            usage_count: 0,
            scope: PromoScope::AllProducts,
        }
    }

    /// Restrict the code to a validity window. Either bound may be open.
    ///
    /// # Errors
    ///
    /// Returns [`PromotionError::InvertedWindow`] if `until` is before `from`.
    pub fn with_window(
        mut self,
        from: Option<Timestamp>,
        until: Option<Timestamp>,
    ) -> Result<Self, PromotionError> {
        if let (Some(from), Some(until)) = (from, until)
            && until < from
        {
            return Err(PromotionError::InvertedWindow);
        }

        self.valid_from = from;
        self.valid_until = until;

        Ok(self)
    }

    /// Set a usage limit and the current usage count.
    #[must_use]
    pub fn with_usage(mut self, limit: Option<u32>, count: u32) -> Self {
        self.usage_limit = limit;
        self.usage_count = count;
        self
    }

    /// Set the applicability scope.
    #[must_use]
    pub fn with_scope(mut self, scope: PromoScope) -> Self {
        self.scope = scope;
        self
    }

    /// Switch the code on or off.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Case-insensitive comparison against customer input.
    pub fn matches_code(&self, input: &str) -> bool {
        normalize_code(&self.code) == normalize_code(input)
    }

    /// Whether `at` lies inside the validity window. Bounds are inclusive.
    pub fn is_within_window(&self, at: Timestamp) -> bool {
        let started = self.valid_from.is_none_or(|from| at >= from);
        let not_ended = self.valid_until.is_none_or(|until| at <= until);

        started && not_ended
    }

    /// Whether the usage limit has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
    }

    /// Whether the code may reduce a total at `at`: active, inside its window and not
    /// exhausted.
    pub fn is_usable_at(&self, at: Timestamp) -> bool {
        self.is_active && self.is_within_window(at) && !self.is_exhausted()
    }

    /// Whether the discount applies to a product.
    pub fn applies_to(&self, product: &Product) -> bool {
        self.scope.applies_to(product)
    }
}

/// Canonical form of a promo code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::{currency::Rupiah, products::TaxRate};

    use super::*;

    fn product(id: &str, category: ProductCategory) -> TestResult<Product> {
        Ok(Product {
            id: ProductId::from(id),
            name: id.to_string(),
            price: Rupiah::new(10_000),
            tax_rate: TaxRate::from_points(11)?,
            stock: 1,
            category,
        })
    }

    #[test]
    fn discount_percentage_bounds() {
        assert!(DiscountPercentage::new(0).is_err());
        assert!(DiscountPercentage::new(1).is_ok());
        assert!(DiscountPercentage::new(100).is_ok());
        assert_eq!(
            DiscountPercentage::new(101),
            Err(PromotionError::InvalidDiscount(101))
        );
        assert_eq!(
            DiscountPercentage::new(300),
            Err(PromotionError::InvalidDiscount(300))
        );
    }

    #[test]
    fn codes_are_stored_upper_cased_and_match_case_insensitively() -> TestResult {
        let promo = PromoCode::new("  hemat10 ", DiscountPercentage::new(10)?);

        assert_eq!(promo.code, "HEMAT10");
        assert!(promo.matches_code("Hemat10"));
        assert!(!promo.matches_code("HEMAT1"));

        Ok(())
    }

    #[test]
    fn window_bounds_are_inclusive_and_optional() -> TestResult {
        let now = Timestamp::now();
        let promo = PromoCode::new("X", DiscountPercentage::new(5)?)
            .with_window(Some(now), Some(now + 1.hour()))?;

        assert!(promo.is_within_window(now));
        assert!(promo.is_within_window(now + 1.hour()));
        assert!(!promo.is_within_window(now - 1.second()));
        assert!(!promo.is_within_window(now + 2.hours()));

        let open_ended = PromoCode::new("Y", DiscountPercentage::new(5)?)
            .with_window(Some(now), None)?;

        assert!(open_ended.is_within_window(now + 10_000.hours()));

        Ok(())
    }

    #[test]
    fn inverted_window_is_rejected() -> TestResult {
        let now = Timestamp::now();
        let result =
            PromoCode::new("X", DiscountPercentage::new(5)?).with_window(Some(now), Some(now - 1.hour()));

        assert_eq!(result, Err(PromotionError::InvertedWindow));

        Ok(())
    }

    #[test]
    fn exhausted_when_count_reaches_limit() -> TestResult {
        let promo = PromoCode::new("X", DiscountPercentage::new(5)?);

        assert!(!promo.clone().with_usage(None, 1_000).is_exhausted());
        assert!(!promo.clone().with_usage(Some(3), 2).is_exhausted());
        assert!(promo.with_usage(Some(3), 3).is_exhausted());

        Ok(())
    }

    #[test]
    fn restricted_scope_matches_ids_or_categories() -> TestResult {
        let scope = PromoScope::Restricted {
            product_ids: SmallVec::from_iter([ProductId::from("tote")]),
            categories: SmallVec::from_iter([ProductCategory::Class]),
        };

        assert!(scope.applies_to(&product("tote", ProductCategory::Merchandise)?));
        assert!(scope.applies_to(&product("art-class", ProductCategory::Class)?));
        assert!(!scope.applies_to(&product("kit", ProductCategory::PlayKit)?));
        assert!(PromoScope::AllProducts.applies_to(&product("kit", ProductCategory::PlayKit)?));

        Ok(())
    }

    #[test]
    fn deserializes_with_defaults() -> TestResult {
        let yaml = r"
code: RAMADAN
discount: 15
scope:
  type: restricted
  categories: [merchandise]
";
        let promo: PromoCode = serde_norway::from_str(yaml)?;

        assert!(promo.is_active);
        assert_eq!(promo.usage_count, 0);
        assert_eq!(promo.discount.points(), 15);
        assert_eq!(
            promo.scope,
            PromoScope::categories([ProductCategory::Merchandise])
        );

        Ok(())
    }

    #[test]
    fn deserialization_rejects_unknown_fields() {
        let yaml = r"
code: RAMADAN
discount: 15
free_shipping: true
";
        assert!(serde_norway::from_str::<PromoCode>(yaml).is_err());
    }
}
