//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    checkout::CheckoutService,
    database::{self, Db},
    domain::{
        orders::{OrdersService, PgOrdersService},
        products::{PgProductsService, ProductsService},
        promo_codes::{PgPromoCodesService, PromoCodesService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub products: Arc<dyn ProductsService>,
    pub promo_codes: Arc<dyn PromoCodesService>,
    pub orders: Arc<dyn OrdersService>,
    pub checkout: Arc<CheckoutService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("checkout", &self.checkout)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire services around an existing database handle.
    #[must_use]
    pub fn new(db: &Db) -> Self {
        let promo_codes: Arc<dyn PromoCodesService> =
            Arc::new(PgPromoCodesService::new(db.clone()));
        let orders: Arc<dyn OrdersService> = Arc::new(PgOrdersService::new(db.clone()));

        Self {
            products: Arc::new(PgProductsService::new(db.clone())),
            checkout: Arc::new(CheckoutService::new(
                Arc::clone(&orders),
                Arc::clone(&promo_codes),
            )),
            promo_codes,
            orders,
        }
    }

    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::new(&Db::new(pool)))
    }
}
