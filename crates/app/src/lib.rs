//! Persistence, checkout and logging for the Athfal storefront.

pub mod checkout;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;

#[cfg(test)]
mod test;

mod uuids;
