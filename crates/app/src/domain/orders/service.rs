//! Orders Service

use async_trait::async_trait;
use athfal::orders::{OrderItemSnapshot, OrderStatus};
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::orders::{
        OrdersServiceError,
        data::{NewOrder, NewOrderItem},
        records::{OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid},
        repositories::{PgOrderItemsRepository, PgOrdersRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(
            order_uuid = %order.uuid,
            payment_method = %order.payment_method,
            total = order.total.value(),
            promo_code = tracing::field::Empty
        ),
        err
    )]
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError> {
        if let Some(code) = &order.promo_code {
            Span::current().record("promo_code", tracing::field::display(code));
        }

        let mut tx = self.db.begin().await?;

        let record = self.orders.create_order(&mut tx, &order).await?;

        tx.commit().await?;

        info!(order_uuid = %record.uuid, "created order");

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.create_order_items",
        skip(self, items),
        fields(order_uuid = %order, item_count = items.len()),
        err
    )]
    async fn create_order_items(
        &self,
        order: OrderUuid,
        items: Vec<OrderItemSnapshot>,
    ) -> Result<Vec<OrderItemRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut records = Vec::with_capacity(items.len());

        for item in items {
            let new_item = NewOrderItem {
                uuid: OrderItemUuid::new(),
                item,
            };

            records.push(self.items.create_order_item(&mut tx, order, &new_item).await?);
        }

        tx.commit().await?;

        Ok(records)
    }

    #[tracing::instrument(
        name = "orders.service.get_order",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.orders.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "orders.service.get_order_items",
        skip(self),
        fields(order_uuid = %order),
        err
    )]
    async fn get_order_items(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let records = self.items.get_order_items(&mut tx, order).await?;

        tx.commit().await?;

        Ok(records)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip(self),
        fields(order_uuid = %order, from = tracing::field::Empty, to = %status),
        err
    )]
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        Span::current().record("from", tracing::field::display(current.status));

        let next = current.status.transition(status)?;

        let record = self.orders.update_status(&mut tx, order, next).await?;

        tx.commit().await?;

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Persist an order header.
    async fn create_order(&self, order: NewOrder) -> Result<OrderRecord, OrdersServiceError>;

    /// Persist the line items of an existing order, all or nothing.
    async fn create_order_items(
        &self,
        order: OrderUuid,
        items: Vec<OrderItemSnapshot>,
    ) -> Result<Vec<OrderItemRecord>, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError>;

    /// Retrieve an order's line items.
    async fn get_order_items(
        &self,
        order: OrderUuid,
    ) -> Result<Vec<OrderItemRecord>, OrdersServiceError>;

    /// Move an order to a new status, subject to the order lifecycle.
    async fn update_status(
        &self,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use athfal::orders::OrderError;
    use testresult::TestResult;

    use crate::test::{
        TestContext,
        helpers::{kit_item, new_order},
    };

    use super::*;

    #[tokio::test]
    async fn create_order_starts_pending() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = OrderUuid::new();

        let order = ctx.orders.create_order(new_order(uuid, 2)).await?;

        assert_eq!(order.uuid, uuid);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total.value(), 200_000);
        assert_eq!(ctx.orders.get_order(uuid).await?, order);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_order_items_map_to_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let order = OrderUuid::new();

        ctx.orders.create_order(new_order(order, 1)).await?;
        ctx.orders
            .create_order_items(order, vec![kit_item(1)])
            .await?;

        let result = ctx
            .orders
            .create_order_items(order, vec![kit_item(1)])
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );
        assert_eq!(ctx.orders.get_order_items(order).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn items_for_unknown_order_are_an_invalid_reference() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .create_order_items(OrderUuid::new(), vec![kit_item(1)])
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_status_follows_lifecycle() -> TestResult {
        let ctx = TestContext::new().await;
        let order = OrderUuid::new();

        ctx.orders.create_order(new_order(order, 1)).await?;

        let processing = ctx
            .orders
            .update_status(order, OrderStatus::Processing)
            .await?;

        assert_eq!(processing.status, OrderStatus::Processing);

        let result = ctx.orders.update_status(order, OrderStatus::Pending).await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InvalidStatusTransition(
                    OrderError::InvalidStatusTransition {
                        from: OrderStatus::Processing,
                        to: OrderStatus::Pending,
                    }
                ))
            ),
            "expected InvalidStatusTransition, got {result:?}"
        );
        assert_eq!(
            ctx.orders.get_order(order).await?.status,
            OrderStatus::Processing
        );

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_status_updates_apply_one_transition_each() -> TestResult {
        let ctx = TestContext::new().await;
        let order = OrderUuid::new();

        ctx.orders.create_order(new_order(order, 1)).await?;

        let (shipped, cancelled) = tokio::join!(
            async {
                ctx.orders
                    .update_status(order, OrderStatus::Processing)
                    .await?;
                ctx.orders.update_status(order, OrderStatus::Shipped).await
            },
            ctx.orders.update_status(order, OrderStatus::Cancelled),
        );

        let final_status = ctx.orders.get_order(order).await?.status;

        match (shipped, cancelled) {
            (Ok(shipped), Err(_)) => assert_eq!(final_status, shipped.status),
            (Err(_), Ok(cancelled)) => assert_eq!(final_status, cancelled.status),
            other => return Err(format!("expected exactly one path to win, got {other:?}").into()),
        }

        Ok(())
    }

    #[tokio::test]
    async fn update_status_of_unknown_order_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .orders
            .update_status(OrderUuid::new(), OrderStatus::Processing)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
