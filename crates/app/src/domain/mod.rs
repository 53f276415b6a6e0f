//! Athfal Domain Concerns

pub mod orders;
pub mod products;
pub mod promo_codes;
