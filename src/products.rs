//! Products
//!
//! Catalog entries as seen by the cart. Products are owned by the catalog; the cart and the
//! pricing engine only ever read them.

use std::{borrow::Borrow, fmt, str::FromStr};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::currency::Rupiah;

/// Errors raised while constructing catalog values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// Tax rate outside of `0..=100` percentage points.
    #[error("tax rate must be between 0 and 100 percent, got {0}")]
    InvalidTaxRate(Decimal),

    /// Category slug is not one of the fixed storefront categories.
    #[error("unknown product category: {0}")]
    UnknownCategory(String),
}

/// Product identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProductId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ProductId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed storefront categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductCategory {
    /// Scheduled classes
    Class,

    /// At-home play kits
    PlayKit,

    /// Branded merchandise
    Merchandise,

    /// One-off workshops
    Workshop,

    /// Downloadable e-books
    EBook,
}

impl ProductCategory {
    /// Every category, in display order.
    pub const ALL: [ProductCategory; 5] = [
        ProductCategory::Class,
        ProductCategory::PlayKit,
        ProductCategory::Merchandise,
        ProductCategory::Workshop,
        ProductCategory::EBook,
    ];

    /// URL slug of the category.
    pub const fn slug(self) -> &'static str {
        match self {
            ProductCategory::Class => "class",
            ProductCategory::PlayKit => "play-kit",
            ProductCategory::Merchandise => "merchandise",
            ProductCategory::Workshop => "workshop",
            ProductCategory::EBook => "e-book",
        }
    }
}

impl FromStr for ProductCategory {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let slug = s.trim();

        Self::ALL
            .into_iter()
            .find(|category| category.slug() == slug)
            .ok_or_else(|| ProductError::UnknownCategory(slug.to_string()))
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Tax rate in percentage points (`11` means 11%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// No tax.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a tax rate from percentage points.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidTaxRate`] when the rate is outside `0..=100`.
    pub fn new(points: Decimal) -> Result<Self, ProductError> {
        if points.is_sign_negative() || points > Decimal::ONE_HUNDRED {
            return Err(ProductError::InvalidTaxRate(points));
        }

        Ok(Self(points.normalize()))
    }

    /// Create a tax rate from whole percentage points.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidTaxRate`] when the rate is above 100.
    pub fn from_points(points: u32) -> Result<Self, ProductError> {
        Self::new(Decimal::from(points))
    }

    /// Percentage points of the rate.
    pub const fn points(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = ProductError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaxRate> for Decimal {
    fn from(value: TaxRate) -> Self {
        value.0
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Unit price
    pub price: Rupiah,

    /// Tax rate applied to this product's lines
    pub tax_rate: TaxRate,

    /// Units available for sale
    pub stock: u32,

    /// Storefront category
    pub category: ProductCategory,
}

/// Read-only product lookup keyed by product identifier.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: FxHashMap<ProductId, Product>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Look up a product by identifier.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// Number of products in the catalog.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Iterate over all products, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut catalog = Self::new();

        for product in iter {
            catalog.insert(product);
        }

        catalog
    }
}
