//! Order Data

use athfal::{
    currency::Rupiah,
    orders::{CustomerDetails, OrderDraft, OrderItemSnapshot, PaymentMethod},
};

use crate::domain::orders::records::{OrderItemUuid, OrderUuid};

/// New Order Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub customer: CustomerDetails,
    pub payment_method: PaymentMethod,
    pub subtotal: Rupiah,
    pub tax_amount: Rupiah,
    pub discount_amount: Rupiah,
    pub total: Rupiah,
    pub promo_code: Option<String>,
}

impl NewOrder {
    /// Order header for a draft; line items are written separately.
    #[must_use]
    pub fn from_draft(uuid: OrderUuid, draft: &OrderDraft) -> Self {
        Self {
            uuid,
            customer: draft.customer.clone(),
            payment_method: draft.payment_method,
            subtotal: draft.subtotal,
            tax_amount: draft.tax_amount,
            discount_amount: draft.discount_amount,
            total: draft.total,
            promo_code: draft.promo_code.clone(),
        }
    }
}

/// New Order Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub uuid: OrderItemUuid,
    pub item: OrderItemSnapshot,
}
