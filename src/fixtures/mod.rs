//! Fixtures
//!
//! YAML catalog and promo code data for offline commands and tests. A fixture set named
//! `storefront` lives at `products/storefront.yml` and `promo_codes/storefront.yml` under the
//! base path.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    cart::Cart,
    fixtures::{products::ProductsFixture, promo_codes::PromoCodesFixture},
    products::{Catalog, Product, ProductError},
    promotions::{PromoCode, PromotionError},
};

pub mod products;
pub mod promo_codes;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,

        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid product data
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Invalid promo code data
    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Two promo codes normalise to the same code
    #[error("Duplicate promo code: {0}")]
    DuplicatePromoCode(String),
}

/// Fixture
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    catalog: Catalog,
    promo_codes: Vec<PromoCode>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            promo_codes: Vec::new(),
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = read(&self.base_path.join("products").join(format!("{name}.yml")))?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            self.catalog.insert(product_fixture.into_product(key)?);
        }

        Ok(self)
    }

    /// Load promo codes from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a code appears twice.
    pub fn load_promo_codes(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let contents = read(&self.base_path.join("promo_codes").join(format!("{name}.yml")))?;
        let fixture: PromoCodesFixture = serde_norway::from_str(&contents)?;

        for promo_fixture in fixture.promo_codes {
            let promo = PromoCode::try_from(promo_fixture)?;

            if self.promo_codes.iter().any(|known| known.code == promo.code) {
                return Err(FixtureError::DuplicatePromoCode(promo.code));
            }

            self.promo_codes.push(promo);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products and promo codes with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture.load_products(name)?.load_promo_codes(name)?;

        Ok(fixture)
    }

    /// Get a product by its key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.catalog
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Loaded catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Loaded promo codes
    pub fn promo_codes(&self) -> &[PromoCode] {
        &self.promo_codes
    }

    /// Build a cart from `(product key, quantity)` pairs, clamping each to stock.
    ///
    /// # Errors
    ///
    /// Returns an error if a product is not found.
    pub fn cart<'k>(
        &self,
        lines: impl IntoIterator<Item = (&'k str, u32)>,
    ) -> Result<Cart, FixtureError> {
        let mut cart = Cart::new();

        for (key, quantity) in lines {
            let product = self.product(key)?;
            let quantity = quantity.min(cart.available_to_add(product));

            cart.add_line(product.clone(), quantity);
        }

        Ok(cart)
    }
}

fn read(path: &Path) -> Result<String, FixtureError> {
    fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a percentage into points.
///
/// Accepts `"11%"` (points) or a fraction such as `"0.11"`.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPercentage`] if the value is not a number.
pub fn parse_percent_points(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();
    let invalid = |_err| FixtureError::InvalidPercentage(s.to_string());

    if let Some(points) = trimmed.strip_suffix('%') {
        points.trim().parse::<Decimal>().map_err(invalid)
    } else {
        let fraction = trimmed.parse::<Decimal>().map_err(invalid)?;

        fraction
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))
    }
}
