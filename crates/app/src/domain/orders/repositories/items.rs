//! Order Items Repository

use athfal::{orders::OrderItemSnapshot, products::ProductId};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{amount_param, count_param, try_get_amount, try_get_count},
    domain::orders::{
        data::NewOrderItem,
        records::{OrderItemRecord, OrderItemUuid, OrderUuid},
    },
};

const CREATE_ORDER_ITEM_SQL: &str = include_str!("../sql/create_order_item.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("../sql/get_order_items.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrderItemsRepository;

impl PgOrderItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        new_item: &NewOrderItem,
    ) -> Result<OrderItemRecord, sqlx::Error> {
        let item = &new_item.item;

        query_as::<Postgres, OrderItemRecord>(CREATE_ORDER_ITEM_SQL)
            .bind(new_item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(item.product_id.as_str())
            .bind(&item.product_name)
            .bind(amount_param("unit_price", item.unit_price)?)
            .bind(count_param("quantity", item.quantity)?)
            .bind(amount_param("subtotal", item.subtotal)?)
            .bind(amount_param("tax_amount", item.tax_amount)?)
            .bind(amount_param("discount_amount", item.discount_amount)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, sqlx::Error> {
        query_as::<Postgres, OrderItemRecord>(GET_ORDER_ITEMS_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            item: OrderItemSnapshot {
                product_id: ProductId::new(row.try_get::<String, _>("product_id")?),
                product_name: row.try_get("product_name")?,
                unit_price: try_get_amount(row, "unit_price")?,
                quantity: try_get_count(row, "quantity")?,
                subtotal: try_get_amount(row, "subtotal")?,
                tax_amount: try_get_amount(row, "tax_amount")?,
                discount_amount: try_get_amount(row, "discount_amount")?,
            },
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
