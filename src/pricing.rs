//! Pricing
//!
//! Derives subtotal, tax, discount and grand total from cart lines and an optional promo code.
//!
//! Rounding happens once per line: each line's tax and discount are rounded to whole Rupiah
//! (midpoint away from zero) before being summed, so the aggregate figures always equal the sum
//! of the per-line figures shown on receipts and order snapshots.

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    cart::CartLine,
    currency::Rupiah,
    products::ProductId,
    promotions::PromoCode,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A line or running total exceeded the representable range.
    #[error("amount overflowed while pricing product {0}")]
    Overflow(ProductId),

    /// Cart totals exceeded the representable range.
    #[error("cart total overflowed")]
    TotalOverflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed")]
    PercentConversion,
}

/// Take `points` percent of `amount`, rounded to whole Rupiah (midpoint away from zero).
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result cannot be represented.
pub fn percent_of(amount: Rupiah, points: Decimal) -> Result<Rupiah, PricingError> {
    Decimal::from(amount.value())
        .checked_mul(points)
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_u64())
        .map(Rupiah::new)
        .ok_or(PricingError::PercentConversion)
}

/// Aggregate figures of a priced cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Sum of line prices before tax and discount
    pub subtotal: Rupiah,

    /// Sum of per-line tax
    pub tax_amount: Rupiah,

    /// Discount actually applied
    pub discount_amount: Rupiah,

    /// Amount payable
    pub total: Rupiah,
}

impl Totals {
    /// Combine the figures, clamping the discount so the total never goes below zero.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::TotalOverflow`] if subtotal plus tax overflows.
    pub fn new(
        subtotal: Rupiah,
        tax_amount: Rupiah,
        discount_amount: Rupiah,
    ) -> Result<Self, PricingError> {
        let gross = subtotal
            .checked_add(tax_amount)
            .ok_or(PricingError::TotalOverflow)?;

        let discount_amount = discount_amount.min(gross);

        Ok(Self {
            subtotal,
            tax_amount,
            discount_amount,
            total: gross.saturating_sub(discount_amount),
        })
    }
}

/// One cart line after pricing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// Product identifier
    pub product_id: ProductId,

    /// Product name at pricing time
    pub product_name: String,

    /// Unit price at pricing time
    pub unit_price: Rupiah,

    /// Units
    pub quantity: u32,

    /// Unit price multiplied by quantity
    pub subtotal: Rupiah,

    /// Tax on the line subtotal
    pub tax_amount: Rupiah,

    /// Promo discount on the line subtotal
    pub discount_amount: Rupiah,

    /// Whether the applied promo's scope covers this line
    pub eligible: bool,
}

/// Cart priced at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    lines: Vec<PricedLine>,
    totals: Totals,
    promo_code: Option<String>,
}

impl PricedCart {
    /// Priced lines, in cart order.
    pub fn lines(&self) -> &[PricedLine] {
        &self.lines
    }

    /// Aggregate figures.
    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Sum of line prices before tax and discount.
    pub fn subtotal(&self) -> Rupiah {
        self.totals.subtotal
    }

    /// Sum of per-line tax.
    pub fn tax_amount(&self) -> Rupiah {
        self.totals.tax_amount
    }

    /// Discount applied.
    pub fn discount_amount(&self) -> Rupiah {
        self.totals.discount_amount
    }

    /// Amount payable, never negative.
    pub fn total(&self) -> Rupiah {
        self.totals.total
    }

    /// Code of the promo that reduced the total, if any.
    pub fn promo_code(&self) -> Option<&str> {
        self.promo_code.as_deref()
    }

    /// Whether nothing was priced.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Price cart lines with an optional promo code, judging promo validity at `at`.
///
/// A promo that is inactive, outside its window or exhausted contributes no discount. Lines
/// outside the promo's scope count towards subtotal and tax but not the discount base.
///
/// # Errors
///
/// Returns a [`PricingError`] if any amount overflows.
pub fn price_cart(
    lines: &[CartLine],
    promo: Option<&PromoCode>,
    at: Timestamp,
) -> Result<PricedCart, PricingError> {
    let promo = promo.filter(|promo| promo.is_usable_at(at));

    let mut priced = Vec::with_capacity(lines.len());
    let mut subtotal = Rupiah::ZERO;
    let mut tax_amount = Rupiah::ZERO;
    let mut discount_amount = Rupiah::ZERO;

    for line in lines {
        let product = &line.product;
        let overflow = || PricingError::Overflow(product.id.clone());

        let line_subtotal = line.subtotal().ok_or_else(overflow)?;
        let line_tax = percent_of(line_subtotal, product.tax_rate.points())?;

        let eligible = promo.is_some_and(|promo| promo.applies_to(product));

        let line_discount = match promo {
            Some(promo) if eligible => {
                percent_of(line_subtotal, Decimal::from(promo.discount.points()))?
            }
            _ => Rupiah::ZERO,
        };

        subtotal = subtotal.checked_add(line_subtotal).ok_or_else(overflow)?;
        tax_amount = tax_amount.checked_add(line_tax).ok_or_else(overflow)?;
        discount_amount = discount_amount
            .checked_add(line_discount)
            .ok_or_else(overflow)?;

        priced.push(PricedLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity: line.quantity,
            subtotal: line_subtotal,
            tax_amount: line_tax,
            discount_amount: line_discount,
            eligible,
        });
    }

    let totals = Totals::new(subtotal, tax_amount, discount_amount)?;
    let promo_code = promo
        .filter(|_| totals.discount_amount > Rupiah::ZERO)
        .map(|promo| promo.code.clone());

    Ok(PricedCart {
        lines: priced,
        totals,
        promo_code,
    })
}
