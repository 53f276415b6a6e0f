//! Order Records

use athfal::{
    currency::Rupiah,
    orders::{CustomerDetails, OrderItemSnapshot, OrderStatus, PaymentMethod},
};
use jiff::Timestamp;
use serde::Serialize;

use crate::uuids::TypedUuid;

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub customer: CustomerDetails,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub subtotal: Rupiah,
    pub tax_amount: Rupiah,
    pub discount_amount: Rupiah,
    pub total: Rupiah,
    pub promo_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Order Item UUID
pub type OrderItemUuid = TypedUuid<OrderItemRecord>;

/// Order Item Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItemRecord {
    pub uuid: OrderItemUuid,
    pub order_uuid: OrderUuid,
    #[serde(flatten)]
    pub item: OrderItemSnapshot,
    pub created_at: Timestamp,
}
