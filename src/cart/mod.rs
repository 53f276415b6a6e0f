//! Cart
//!
//! An ordered collection of lines, one per product. The cart itself is plain data; durable
//! persistence lives in [`store::CartStore`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::storage::StorageError,
    currency::Rupiah,
    products::{Catalog, Product, ProductId},
};

pub mod storage;
pub mod store;

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Persisting the cart failed. The in-memory cart keeps the mutation.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Reasons persisted cart state is rejected on rehydration.
#[derive(Debug, Error)]
pub enum MalformedCart {
    /// The blob is not a valid cart document.
    #[error("cart blob could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    /// A line has a zero quantity.
    #[error("line for product {0} has zero quantity")]
    ZeroQuantity(ProductId),

    /// Two lines reference the same product.
    #[error("product {0} appears on more than one line")]
    DuplicateLine(ProductId),
}

/// A single product and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartLine {
    /// Snapshot of the product at the time it was added or last refreshed
    pub product: Product,

    /// Units of the product, always at least one
    pub quantity: u32,
}

impl CartLine {
    /// Unit price multiplied by quantity, `None` on overflow.
    pub fn subtotal(&self) -> Option<Rupiah> {
        self.product.price.checked_mul(self.quantity)
    }
}

/// Shopping cart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from existing lines, rejecting zero quantities and duplicate products.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedCart`] if any line breaks the cart invariants.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, MalformedCart> {
        for (idx, line) in lines.iter().enumerate() {
            if line.quantity == 0 {
                return Err(MalformedCart::ZeroQuantity(line.product.id.clone()));
            }

            let seen_before = lines
                .iter()
                .take(idx)
                .any(|other| other.product.id == line.product.id);

            if seen_before {
                return Err(MalformedCart::DuplicateLine(line.product.id.clone()));
            }
        }

        Ok(Self { lines })
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line for a product.
    pub fn line(&self, product: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id.as_str() == product)
    }

    /// Quantity held for a product, zero when absent.
    pub fn quantity_of(&self, product: &str) -> u32 {
        self.line(product).map_or(0, |line| line.quantity)
    }

    /// Total units across every line.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line is incremented and takes the newer product snapshot; otherwise a new
    /// line is appended. A zero quantity is ignored.
    pub fn add_line(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }

        match self.position(product.id.as_str()) {
            Some(idx) => {
                if let Some(line) = self.lines.get_mut(idx) {
                    line.quantity = line.quantity.saturating_add(quantity);
                    line.product = product;
                }
            }
            None => self.lines.push(CartLine { product, quantity }),
        }
    }

    /// Remove the line for a product. Returns whether a line was removed.
    pub fn remove_line(&mut self, product: &str) -> bool {
        match self.position(product) {
            Some(idx) => {
                self.lines.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Replace a line's quantity. Quantities of zero or below remove the line.
    ///
    /// Returns whether the cart changed. Unknown products are ignored.
    pub fn set_quantity(&mut self, product: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_line(product);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        match self.position(product).and_then(|idx| self.lines.get_mut(idx)) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Replace each line's product snapshot with the catalog's current entry.
    ///
    /// Lines whose product is no longer in the catalog are dropped; their ids are returned.
    pub fn refresh_products(&mut self, catalog: &Catalog) -> SmallVec<[ProductId; 4]> {
        let mut dropped = SmallVec::new();

        self.lines.retain_mut(|line| match catalog.get(line.product.id.as_str()) {
            Some(current) => {
                line.product = current.clone();
                true
            }
            None => {
                dropped.push(line.product.id.clone());
                false
            }
        });

        dropped
    }

    /// How many more units of `product` can be added before reaching its stock.
    pub fn available_to_add(&self, product: &Product) -> u32 {
        product
            .stock
            .saturating_sub(self.quantity_of(product.id.as_str()))
    }

    fn position(&self, product: &str) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product.id.as_str() == product)
    }
}

/// Stock guard applied by callers before mutating the cart.
///
/// The cart itself does not enforce stock; this clamps a requested quantity to what the
/// product has available. A zero result means nothing should be added.
pub fn clamp_to_stock(product: &Product, requested: u32) -> u32 {
    requested.min(product.stock)
}
