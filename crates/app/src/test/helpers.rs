//! Test Helpers

use athfal::{
    currency::Rupiah,
    orders::{CustomerDetails, OrderItemSnapshot, PaymentMethod},
    products::{Product, ProductCategory, ProductId, TaxRate},
};

use crate::{
    database::{amount_param, count_param},
    domain::orders::{data::NewOrder, records::OrderUuid},
    test::TestContext,
};

pub(crate) fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Siti Rahma".to_string(),
        email: "siti@example.com".to_string(),
        phone: "081234567890".to_string(),
        address: Some("Jl. Melati 7, Bandung".to_string()),
        notes: None,
    }
}

pub(crate) fn play_kit() -> Product {
    Product {
        id: ProductId::from("sensory-kit"),
        name: "Sensory Play Kit".to_string(),
        price: Rupiah::new(100_000),
        tax_rate: TaxRate::ZERO,
        stock: 10,
        category: ProductCategory::PlayKit,
    }
}

/// Insert `product` straight into the catalog table.
pub(crate) async fn insert_product(ctx: &TestContext, product: &Product) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, name, price, tax_rate, stock, category) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(product.id.as_str())
    .bind(&product.name)
    .bind(amount_param("price", product.price)?)
    .bind(product.tax_rate.points())
    .bind(count_param("stock", product.stock)?)
    .bind(product.category.slug())
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}

/// Insert an active, unscoped promo code with the given usage counters.
pub(crate) async fn insert_promo_code(
    ctx: &TestContext,
    code: &str,
    discount_percentage: i32,
    usage_limit: Option<i32>,
    usage_count: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO promo_codes (code, discount_percentage, usage_limit, usage_count) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(code)
    .bind(discount_percentage)
    .bind(usage_limit)
    .bind(usage_count)
    .execute(ctx.db.pool())
    .await?;

    Ok(())
}

pub(crate) async fn usage_count(ctx: &TestContext, code: &str) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("SELECT usage_count FROM promo_codes WHERE code = $1")
        .bind(code)
        .fetch_one(ctx.db.pool())
        .await
}

/// Header for a one-line order of `quantity` kits at 100.000 each, untaxed.
pub(crate) fn new_order(uuid: OrderUuid, quantity: u32) -> NewOrder {
    let total = Rupiah::new(100_000 * u64::from(quantity));

    NewOrder {
        uuid,
        customer: customer(),
        payment_method: PaymentMethod::BankTransfer,
        subtotal: total,
        tax_amount: Rupiah::ZERO,
        discount_amount: Rupiah::ZERO,
        total,
        promo_code: None,
    }
}

pub(crate) fn kit_item(quantity: u32) -> OrderItemSnapshot {
    let kit = play_kit();

    OrderItemSnapshot {
        product_id: kit.id,
        product_name: kit.name,
        unit_price: kit.price,
        quantity,
        subtotal: Rupiah::new(100_000 * u64::from(quantity)),
        tax_amount: Rupiah::ZERO,
        discount_amount: Rupiah::ZERO,
    }
}
