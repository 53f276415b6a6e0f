//! Athfal
//!
//! Cart, promo code and order pricing for the Athfal Playhouse storefront. Everything in this
//! crate is synchronous and free of network access; persistence of orders lives in `athfal-app`.

pub mod cart;
pub mod currency;
pub mod fixtures;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod receipt;
pub mod settings;
