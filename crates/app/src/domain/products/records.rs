//! Product Records

use athfal::{
    currency::Rupiah,
    products::{Product, ProductError, ProductId, TaxRate},
};
use jiff::Timestamp;
use rust_decimal::Decimal;

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    pub price: Rupiah,
    pub tax_rate: Decimal,
    pub stock: u32,
    pub category: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::from(record.id),
            name: record.name,
            price: record.price,
            tax_rate: TaxRate::new(record.tax_rate)?,
            stock: record.stock,
            category: record.category.parse()?,
        })
    }
}
