//! Products service.

use async_trait::async_trait;
use athfal::products::{Catalog, Product, ProductId};
use mockall::automock;
use tracing::Span;

use crate::{
    database::Db,
    domain::products::{errors::ProductsServiceError, repository::PgProductsRepository},
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    #[tracing::instrument(
        name = "products.service.list_products",
        skip(self),
        fields(product_count = tracing::field::Empty),
        err
    )]
    async fn list_products(&self) -> Result<Catalog, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.repository.list_products(&mut tx).await?;

        tx.commit().await?;

        Span::current().record("product_count", records.len());

        records
            .into_iter()
            .map(|record| Product::try_from(record).map_err(ProductsServiceError::from))
            .collect()
    }

    #[tracing::instrument(
        name = "products.service.get_product",
        skip(self),
        fields(product_id = %product),
        err
    )]
    async fn get_product(&self, product: ProductId) -> Result<Product, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .get_product(&mut tx, product.as_str())
            .await?;

        tx.commit().await?;

        Ok(Product::try_from(record)?)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves every listed product as a catalog.
    async fn list_products(&self) -> Result<Catalog, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductId) -> Result<Product, ProductsServiceError>;
}
