//! Checkout
//!
//! Turns a priced cart into a persisted order. The order header is written first, then its
//! line items; promo usage is counted only once both are stored. The cart is cleared only
//! after the whole submission succeeds.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use athfal::{
    cart::{Cart, CartError, storage::CartStorage, store::CartStore},
    orders::{CustomerDetails, OrderDraft, OrderError, PaymentMethod},
    pricing::{PricingError, price_cart},
    products::{Catalog, ProductId},
    promotions::PromoCode,
};
use jiff::Timestamp;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{
    orders::{OrdersService, OrdersServiceError, data::NewOrder, records::OrderUuid},
    promo_codes::PromoCodesService,
};

/// Errors that can occur while submitting an order.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Required customer fields or the payment method are missing. Nothing was written.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(SmallVec<[&'static str; 4]>),

    /// The cart has no lines. Nothing was written.
    #[error("cannot submit an empty cart")]
    EmptyCart,

    /// Another submission is still running.
    #[error("an order submission is already in progress")]
    InFlight,

    /// Cart lines refer to products missing from the current catalog. Nothing was written.
    #[error("products no longer available: {}", join_ids(.0))]
    UnavailableProducts(SmallVec<[ProductId; 4]>),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The draft was rejected for another reason.
    #[error(transparent)]
    Order(OrderError),

    /// The order was stored but its items were not. Retry the items against `order`.
    #[error("order {order} was created but its items could not be stored")]
    PartialFailure {
        /// Identifier of the stored order
        order: OrderUuid,

        /// Snapshot to retry item insertion with
        draft: Box<OrderDraft>,

        /// Underlying storage error
        #[source]
        source: OrdersServiceError,
    },

    /// The order could not be stored.
    #[error("failed to store order")]
    Persistence(#[source] OrdersServiceError),
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ProductId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<OrderError> for SubmissionError {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::MissingFields(fields) => Self::MissingFields(fields),
            OrderError::EmptyCart => Self::EmptyCart,
            other => Self::Order(other),
        }
    }
}

/// Customer input collected at checkout.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRequest<'a> {
    /// Customer contact details
    pub customer: &'a CustomerDetails,

    /// Chosen payment method, if any
    pub payment_method: Option<PaymentMethod>,

    /// Promo code that passed validation, if any
    pub promo: Option<&'a PromoCode>,
}

/// Order submission adapter.
pub struct CheckoutService {
    orders: Arc<dyn OrdersService>,
    promo_codes: Arc<dyn PromoCodesService>,
    in_flight: AtomicBool,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

/// Clears the in-flight flag when dropped, including on error or cancellation.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Copy of `cart` with every line's product replaced by its current catalog entry.
///
/// # Errors
///
/// Returns [`SubmissionError::UnavailableProducts`] if any line's product is gone from the
/// catalog. The input cart is never modified.
pub fn refresh_cart(cart: &Cart, catalog: &Catalog) -> Result<Cart, SubmissionError> {
    let mut current = cart.clone();
    let dropped = current.refresh_products(catalog);

    if dropped.is_empty() {
        Ok(current)
    } else {
        Err(SubmissionError::UnavailableProducts(dropped))
    }
}

impl CheckoutService {
    /// Create a checkout adapter writing through the given order and promo code services.
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersService>, promo_codes: Arc<dyn PromoCodesService>) -> Self {
        Self {
            orders,
            promo_codes,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a submission is currently running.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, SubmissionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_previous| InFlightGuard(&self.in_flight))
            .map_err(|_previous| SubmissionError::InFlight)
    }

    /// Validate and persist a draft order.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InFlight`] while another submission runs,
    /// [`SubmissionError::Persistence`] if the order header cannot be stored, and
    /// [`SubmissionError::PartialFailure`] if the header was stored but its items were not.
    #[tracing::instrument(
        name = "checkout.submit",
        skip(self, draft),
        fields(total = draft.total.value(), item_count = draft.items.len()),
        err
    )]
    pub async fn submit(&self, draft: OrderDraft) -> Result<OrderUuid, SubmissionError> {
        let _guard = self.begin()?;

        let order = OrderUuid::new();

        self.orders
            .create_order(NewOrder::from_draft(order, &draft))
            .await
            .map_err(SubmissionError::Persistence)?;

        self.store_items(order, draft).await
    }

    /// Retry item insertion for an order left behind by a partial failure.
    ///
    /// Never creates a new order. Items already stored by an earlier attempt count as success.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::PartialFailure`] again if the items still cannot be stored.
    #[tracing::instrument(name = "checkout.retry_items", skip(self, draft), fields(order_uuid = %order), err)]
    pub async fn retry_items(
        &self,
        order: OrderUuid,
        draft: OrderDraft,
    ) -> Result<OrderUuid, SubmissionError> {
        let _guard = self.begin()?;

        self.store_items(order, draft).await
    }

    /// Price a stored cart against the current catalog, submit it, and clear the cart once
    /// the order is stored.
    ///
    /// Product snapshots held in the cart are never trusted for prices, tax rates or
    /// categories. On any error the cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::UnavailableProducts`] if a line's product is no longer in
    /// `catalog`, or another [`SubmissionError`] if validation, pricing or persistence fails.
    pub async fn submit_cart<S: CartStorage>(
        &self,
        store: &mut CartStore<S>,
        catalog: &Catalog,
        request: CheckoutRequest<'_>,
        at: Timestamp,
    ) -> Result<OrderUuid, SubmissionError> {
        let cart = refresh_cart(store.cart(), catalog)?;
        let priced = price_cart(cart.lines(), request.promo, at)?;
        let draft = OrderDraft::new(request.customer, request.payment_method, &priced)?;

        let order = self.submit(draft).await?;

        if let Err(error) = store.clear() {
            log_clear_failure(order, &error);
        }

        Ok(order)
    }

    async fn store_items(
        &self,
        order: OrderUuid,
        draft: OrderDraft,
    ) -> Result<OrderUuid, SubmissionError> {
        match self
            .orders
            .create_order_items(order, draft.items.clone())
            .await
        {
            Ok(_) | Err(OrdersServiceError::AlreadyExists) => {}
            Err(source) => {
                warn!(order_uuid = %order, error = %source, "order items could not be stored");

                return Err(SubmissionError::PartialFailure {
                    order,
                    draft: Box::new(draft),
                    source,
                });
            }
        }

        if let Some(code) = draft.promo_code {
            match self.promo_codes.increment_usage(code.clone()).await {
                Ok(usage_count) => debug!(order_uuid = %order, code = %code, usage_count, "promo code usage recorded"),
                Err(error) => {
                    warn!(order_uuid = %order, code = %code, %error, "failed to record promo code usage");
                }
            }
        }

        info!(order_uuid = %order, "order submitted");

        Ok(order)
    }
}

fn log_clear_failure(order: OrderUuid, error: &CartError) {
    warn!(order_uuid = %order, %error, "order submitted but the cart could not be cleared");
}
