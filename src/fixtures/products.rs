//! Product Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    currency::Rupiah,
    fixtures::{FixtureError, parse_percent_points},
    products::{Product, ProductCategory, ProductId, TaxRate},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Unit price in whole Rupiah
    pub price: u64,

    /// Tax rate (e.g., "11%" or "0.11")
    #[serde(default)]
    pub tax: Option<String>,

    /// Units in stock
    pub stock: u32,

    /// Storefront category
    pub category: ProductCategory,
}

impl ProductFixture {
    /// Convert into a catalog product identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tax rate is malformed or out of range.
    pub fn into_product(self, key: String) -> Result<Product, FixtureError> {
        let tax_rate = match self.tax.as_deref() {
            Some(tax) => TaxRate::new(parse_percent_points(tax)?)?,
            None => TaxRate::ZERO,
        };

        Ok(Product {
            id: ProductId::from(key),
            name: self.name,
            price: Rupiah::new(self.price),
            tax_rate,
            stock: self.stock,
            category: self.category,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn converts_fixture_with_percentage_tax() -> TestResult {
        let fixture: ProductFixture = serde_norway::from_str(
            "name: Kit\nprice: 100000\ntax: 11%\nstock: 4\ncategory: play-kit\n",
        )?;

        let product = fixture.into_product("kit".to_string())?;

        assert_eq!(product.id.as_str(), "kit");
        assert_eq!(product.tax_rate.points(), Decimal::from(11));
        assert_eq!(product.price, Rupiah::new(100_000));

        Ok(())
    }

    #[test]
    fn missing_tax_means_untaxed() -> TestResult {
        let fixture: ProductFixture =
            serde_norway::from_str("name: Book\nprice: 50000\nstock: 1\ncategory: e-book\n")?;

        assert_eq!(fixture.into_product("book".to_string())?.tax_rate, TaxRate::ZERO);

        Ok(())
    }

    #[test]
    fn rejects_tax_above_one_hundred_percent() -> TestResult {
        let fixture: ProductFixture = serde_norway::from_str(
            "name: Kit\nprice: 1\ntax: 150%\nstock: 1\ncategory: play-kit\n",
        )?;

        assert!(matches!(
            fixture.into_product("kit".to_string()),
            Err(FixtureError::Product(_))
        ));

        Ok(())
    }

    #[test]
    fn rejects_unknown_category() {
        let result = serde_norway::from_str::<ProductFixture>(
            "name: Kit\nprice: 1\nstock: 1\ncategory: toys\n",
        );

        assert!(result.is_err());
    }
}
