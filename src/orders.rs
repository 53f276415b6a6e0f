//! Orders
//!
//! Frozen snapshots of a priced cart, ready to be persisted at checkout, and the order status
//! lifecycle.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    currency::Rupiah,
    pricing::{PricedCart, PricedLine},
    products::ProductId,
};

/// Errors raised while building or updating orders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Required checkout fields are blank or absent.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(SmallVec<[&'static str; 4]>),

    /// Nothing to order.
    #[error("cannot submit an empty cart")]
    EmptyCart,

    /// Status change not permitted by the order lifecycle.
    #[error("cannot move order from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status
        from: OrderStatus,

        /// Requested status
        to: OrderStatus,
    },

    /// Status name not recognised.
    #[error("unknown order status: {0}")]
    UnknownStatus(String),

    /// Payment method name not recognised.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

/// Order status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment confirmation
    #[default]
    Pending,

    /// Paid and being prepared
    Processing,

    /// Handed to the courier
    Shipped,

    /// Delivered or attended
    Completed,

    /// Abandoned or refunded
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Stored name of the status.
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions are allowed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (
                OrderStatus::Pending,
                OrderStatus::Processing | OrderStatus::Cancelled
            ) | (
                OrderStatus::Processing,
                OrderStatus::Shipped | OrderStatus::Completed | OrderStatus::Cancelled
            ) | (OrderStatus::Shipped, OrderStatus::Completed)
        )
    }

    /// Move to `next` if the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidStatusTransition`] otherwise.
    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(OrderError::InvalidStatusTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| OrderError::UnknownStatus(name.to_string()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Manual bank transfer
    BankTransfer,

    /// QRIS scan
    Qris,

    /// E-wallet
    EWallet,

    /// Cash on delivery
    CashOnDelivery,
}

impl PaymentMethod {
    /// Every payment method.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::BankTransfer,
        PaymentMethod::Qris,
        PaymentMethod::EWallet,
        PaymentMethod::CashOnDelivery,
    ];

    /// Stored name of the payment method.
    pub const fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::Qris => "qris",
            PaymentMethod::EWallet => "e-wallet",
            PaymentMethod::CashOnDelivery => "cash-on-delivery",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| OrderError::UnknownPaymentMethod(name.to_string()))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact details captured at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerDetails {
    /// Full name
    pub name: String,

    /// Email address
    pub email: String,

    /// Phone or WhatsApp number
    pub phone: String,

    /// Shipping address, for physical goods
    #[serde(default)]
    pub address: Option<String>,

    /// Free-form notes for the store
    #[serde(default)]
    pub notes: Option<String>,
}

impl CustomerDetails {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> SmallVec<[&'static str; 4]> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    /// Copy with surrounding whitespace removed and blank optional fields dropped.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        let optional = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: optional(&self.address),
            notes: optional(&self.notes),
        }
    }
}

/// Check the customer fields and payment method required to place an order.
///
/// # Errors
///
/// Returns [`OrderError::MissingFields`] naming every blank field, including
/// `payment_method` when none was chosen.
pub fn validate_checkout(
    customer: &CustomerDetails,
    payment_method: Option<PaymentMethod>,
) -> Result<PaymentMethod, OrderError> {
    let mut missing = customer.missing_fields();

    match payment_method {
        Some(method) if missing.is_empty() => Ok(method),
        Some(_) => Err(OrderError::MissingFields(missing)),
        None => {
            missing.push("payment_method");

            Err(OrderError::MissingFields(missing))
        }
    }
}

/// Frozen copy of one priced line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemSnapshot {
    /// Product identifier
    pub product_id: ProductId,

    /// Product name at checkout
    pub product_name: String,

    /// Unit price at checkout
    pub unit_price: Rupiah,

    /// Units ordered
    pub quantity: u32,

    /// Unit price multiplied by quantity
    pub subtotal: Rupiah,

    /// Tax charged on the line
    pub tax_amount: Rupiah,

    /// Discount given on the line
    pub discount_amount: Rupiah,
}

impl From<&PricedLine> for OrderItemSnapshot {
    fn from(line: &PricedLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            product_name: line.product_name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            subtotal: line.subtotal,
            tax_amount: line.tax_amount,
            discount_amount: line.discount_amount,
        }
    }
}

/// Order ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Customer contact details
    pub customer: CustomerDetails,

    /// Chosen payment method
    pub payment_method: PaymentMethod,

    /// Initial status
    pub status: OrderStatus,

    /// Sum of line subtotals
    pub subtotal: Rupiah,

    /// Sum of line tax
    pub tax_amount: Rupiah,

    /// Discount applied
    pub discount_amount: Rupiah,

    /// Amount payable
    pub total: Rupiah,

    /// Promo code referenced by the order, if one reduced the total
    pub promo_code: Option<String>,

    /// Line snapshots
    pub items: Vec<OrderItemSnapshot>,
}

impl OrderDraft {
    /// Validate checkout input and snapshot a priced cart.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingFields`] for blank customer fields or a missing payment
    /// method, and [`OrderError::EmptyCart`] when nothing was priced.
    pub fn new(
        customer: &CustomerDetails,
        payment_method: Option<PaymentMethod>,
        priced: &PricedCart,
    ) -> Result<Self, OrderError> {
        let payment_method = validate_checkout(customer, payment_method)?;

        if priced.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        Ok(Self {
            customer: customer.trimmed(),
            payment_method,
            status: OrderStatus::Pending,
            subtotal: priced.subtotal(),
            tax_amount: priced.tax_amount(),
            discount_amount: priced.discount_amount(),
            total: priced.total(),
            promo_code: priced.promo_code().map(str::to_string),
            items: priced.lines().iter().map(OrderItemSnapshot::from).collect(),
        })
    }
}
