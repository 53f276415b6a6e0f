//! Test context for service-level integration tests.

use std::sync::Arc;

use crate::{
    checkout::CheckoutService,
    database::Db,
    domain::{
        orders::{OrdersService, PgOrdersService},
        products::PgProductsService,
        promo_codes::{PgPromoCodesService, PromoCodesService},
    },
};

use super::db::TestDb;

/// Postgres-backed services over a private, freshly migrated database.
pub struct TestContext {
    pub db: TestDb,
    pub products: PgProductsService,
    pub promo_codes: Arc<PgPromoCodesService>,
    pub orders: Arc<PgOrdersService>,
    pub checkout: CheckoutService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());

        let promo_codes = Arc::new(PgPromoCodesService::new(db.clone()));
        let orders = Arc::new(PgOrdersService::new(db.clone()));

        let checkout = CheckoutService::new(
            Arc::clone(&orders) as Arc<dyn OrdersService>,
            Arc::clone(&promo_codes) as Arc<dyn PromoCodesService>,
        );

        Self {
            products: PgProductsService::new(db),
            promo_codes,
            orders,
            checkout,
            db: test_db,
        }
    }
}
