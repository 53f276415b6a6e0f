//! Cart Store
//!
//! Owns the session cart and writes it through to a [`CartStorage`] slot after every
//! mutation. Rehydration happens once, in [`CartStore::open`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError, CartLine, MalformedCart, storage::CartStorage},
    products::{Catalog, Product, ProductId},
};

/// Serialized shape of the cart slot.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PersistedCart {
    lines: Vec<CartLine>,
}

/// Serialize a cart into the blob format kept in storage.
///
/// # Errors
///
/// Returns [`CartError::Encode`] if serialization fails.
pub fn encode_cart(cart: &Cart) -> Result<String, CartError> {
    let persisted = PersistedCart {
        lines: cart.lines().to_vec(),
    };

    serde_json::to_string(&persisted).map_err(CartError::Encode)
}

/// Parse a stored blob back into a cart.
///
/// # Errors
///
/// Returns [`MalformedCart`] when the blob cannot be decoded or breaks cart invariants.
pub fn decode_cart(blob: &str) -> Result<Cart, MalformedCart> {
    let persisted: PersistedCart = serde_json::from_str(blob)?;

    Cart::from_lines(persisted.lines)
}

/// Session cart with write-through persistence.
#[derive(Debug)]
pub struct CartStore<S: CartStorage> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Open the store, rehydrating any cart found in storage.
    ///
    /// Unreadable or malformed state is discarded and the store starts empty.
    pub fn open(storage: S) -> Self {
        let cart = match storage.load() {
            Ok(Some(blob)) => decode_cart(&blob).unwrap_or_else(|error| {
                warn!(%error, "discarding malformed persisted cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(error) => {
                warn!(%error, "cart storage unreadable; starting with an empty cart");
                Cart::new()
            }
        };

        debug!(lines = cart.len(), "cart rehydrated");

        Self { cart, storage }
    }

    /// Current cart contents.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Add units of a product. See [`Cart::add_line`].
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be persisted.
    pub fn add_line(&mut self, product: Product, quantity: u32) -> Result<(), CartError> {
        self.cart.add_line(product, quantity);
        self.persist()
    }

    /// Remove a product's line. See [`Cart::remove_line`].
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be persisted.
    pub fn remove_line(&mut self, product: &str) -> Result<bool, CartError> {
        let removed = self.cart.remove_line(product);
        self.persist()?;

        Ok(removed)
    }

    /// Replace a product's quantity. See [`Cart::set_quantity`].
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be persisted.
    pub fn set_quantity(&mut self, product: &str, quantity: i64) -> Result<bool, CartError> {
        let changed = self.cart.set_quantity(product, quantity);
        self.persist()?;

        Ok(changed)
    }

    /// Refresh product snapshots from the catalog. See [`Cart::refresh_products`].
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be persisted.
    pub fn refresh_products(
        &mut self,
        catalog: &Catalog,
    ) -> Result<SmallVec<[ProductId; 4]>, CartError> {
        let dropped = self.cart.refresh_products(catalog);

        if !dropped.is_empty() {
            warn!(dropped = ?dropped, "removed cart lines for products no longer in the catalog");
        }

        self.persist()?;

        Ok(dropped)
    }

    /// Empty the cart. Only call once an order has been confirmed.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.cart.clear();
        self.persist()
    }

    fn persist(&mut self) -> Result<(), CartError> {
        let blob = encode_cart(&self.cart)?;

        self.storage.save(&blob)?;

        debug!(lines = self.cart.len(), "cart persisted");

        Ok(())
    }
}
