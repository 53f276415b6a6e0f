//! Promo Code Validation
//!
//! Resolves customer input against the known promo codes and the current cart. Validation is
//! read-only: it never touches usage counts.

use jiff::Timestamp;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::CartLine,
    currency::{Locale, Rupiah},
    promotions::{PromoCode, normalize_code},
};

/// Reasons a promo code is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PromoCodeError {
    /// No promo code matches the input.
    #[error("promo code {0} not found")]
    NotFound(String),

    /// The code exists but has been switched off.
    #[error("promo code {0} is inactive")]
    Inactive(String),

    /// The current time is outside the code's validity window.
    #[error("promo code {0} is not valid at this time")]
    OutOfWindow(String),

    /// The code's usage limit has been reached.
    #[error("promo code {0} has reached its usage limit")]
    UsageExhausted(String),
}

impl PromoCodeError {
    /// Customer-facing message in the given locale.
    pub const fn message(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (PromoCodeError::NotFound(_), Locale::Indonesian) => "Kode promo tidak ditemukan.",
            (PromoCodeError::NotFound(_), Locale::English) => "Promo code not found.",
            (PromoCodeError::Inactive(_), Locale::Indonesian) => "Kode promo sudah tidak aktif.",
            (PromoCodeError::Inactive(_), Locale::English) => "This promo code is no longer active.",
            (PromoCodeError::OutOfWindow(_), Locale::Indonesian) => {
                "Kode promo belum berlaku atau sudah kedaluwarsa."
            }
            (PromoCodeError::OutOfWindow(_), Locale::English) => {
                "This promo code is not yet valid or has expired."
            }
            (PromoCodeError::UsageExhausted(_), Locale::Indonesian) => {
                "Kuota penggunaan kode promo sudah habis."
            }
            (PromoCodeError::UsageExhausted(_), Locale::English) => {
                "This promo code has reached its usage limit."
            }
        }
    }
}

/// Non-blocking findings about an accepted promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoWarning {
    /// No line currently in the cart falls inside the promo's scope, so it discounts nothing.
    NotApplicable,
}

impl PromoWarning {
    /// Customer-facing message in the given locale.
    pub const fn message(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (PromoWarning::NotApplicable, Locale::Indonesian) => {
                "Kode promo tidak berlaku untuk produk di keranjang Anda."
            }
            (PromoWarning::NotApplicable, Locale::English) => {
                "This promo code does not apply to any product in your cart."
            }
        }
    }
}

/// A promo code that passed validation, with any warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPromo<'a> {
    promo: &'a PromoCode,
    warnings: SmallVec<[PromoWarning; 1]>,
}

impl<'a> ValidatedPromo<'a> {
    /// The matched promo code.
    pub fn promo(&self) -> &'a PromoCode {
        self.promo
    }

    /// Warnings raised during validation.
    pub fn warnings(&self) -> &[PromoWarning] {
        &self.warnings
    }

    /// Whether the promo discounts anything in the cart as it stands.
    pub fn is_applicable(&self) -> bool {
        !self.warnings.contains(&PromoWarning::NotApplicable)
    }
}

/// Validate customer input against known promo codes and the current cart.
///
/// Checks run in order: lookup, active flag, validity window, usage limit. A code that
/// discounts nothing in the current cart is accepted with [`PromoWarning::NotApplicable`],
/// since the cart may still change.
///
/// # Errors
///
/// Returns the first failing [`PromoCodeError`].
pub fn validate_promo_code<'a>(
    input: &str,
    promos: &'a [PromoCode],
    lines: &[CartLine],
    at: Timestamp,
) -> Result<ValidatedPromo<'a>, PromoCodeError> {
    let code = normalize_code(input);

    let promo = promos
        .iter()
        .find(|promo| promo.matches_code(&code))
        .ok_or_else(|| PromoCodeError::NotFound(code.clone()))?;

    if !promo.is_active {
        return Err(PromoCodeError::Inactive(code));
    }

    if !promo.is_within_window(at) {
        return Err(PromoCodeError::OutOfWindow(code));
    }

    if promo.is_exhausted() {
        return Err(PromoCodeError::UsageExhausted(code));
    }

    let mut warnings = SmallVec::new();

    if !has_eligible_value(promo, lines) {
        warnings.push(PromoWarning::NotApplicable);
    }

    Ok(ValidatedPromo { promo, warnings })
}

fn has_eligible_value(promo: &PromoCode, lines: &[CartLine]) -> bool {
    lines.iter().any(|line| {
        promo.applies_to(&line.product) && line.subtotal().is_none_or(|value| value > Rupiah::ZERO)
    })
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::{
        products::{Product, ProductCategory, ProductId, TaxRate},
        promotions::{DiscountPercentage, PromoScope},
    };

    use super::*;

    fn line(id: &str, category: ProductCategory) -> TestResult<CartLine> {
        Ok(CartLine {
            product: Product {
                id: ProductId::from(id),
                name: id.to_string(),
                price: Rupiah::new(100_000),
                tax_rate: TaxRate::from_points(11)?,
                stock: 10,
                category,
            },
            quantity: 1,
        })
    }

    fn promo(code: &str) -> TestResult<PromoCode> {
        Ok(PromoCode::new(code, DiscountPercentage::new(10)?))
    }

    #[test]
    fn lookup_is_case_insensitive() -> TestResult {
        let promos = [promo("HEMAT10")?];
        let lines = [line("kit", ProductCategory::PlayKit)?];

        let validated = validate_promo_code("hemat10", &promos, &lines, Timestamp::now())?;

        assert_eq!(validated.promo().code, "HEMAT10");
        assert!(validated.warnings().is_empty());

        Ok(())
    }

    #[test]
    fn unknown_code_is_not_found() -> TestResult {
        let promos = [promo("HEMAT10")?];

        assert_eq!(
            validate_promo_code("diskon", &promos, &[], Timestamp::now()),
            Err(PromoCodeError::NotFound("DISKON".to_string()))
        );

        Ok(())
    }

    #[test]
    fn inactive_code_is_rejected() -> TestResult {
        let promos = [promo("HEMAT10")?.with_active(false)];

        assert_eq!(
            validate_promo_code("HEMAT10", &promos, &[], Timestamp::now()),
            Err(PromoCodeError::Inactive("HEMAT10".to_string()))
        );

        Ok(())
    }

    #[test]
    fn code_outside_window_is_rejected() -> TestResult {
        let now = Timestamp::now();
        let promos = [promo("EARLY")?.with_window(None, Some(now - 1.hour()))?];

        assert_eq!(
            validate_promo_code("EARLY", &promos, &[], now),
            Err(PromoCodeError::OutOfWindow("EARLY".to_string()))
        );

        Ok(())
    }

    #[test]
    fn exhausted_code_is_rejected_even_when_active_and_in_window() -> TestResult {
        let now = Timestamp::now();
        let promos = [promo("LIMITED")?
            .with_window(Some(now - 1.hour()), Some(now + 1.hour()))?
            .with_usage(Some(5), 5)];
        let lines = [line("kit", ProductCategory::PlayKit)?];

        assert_eq!(
            validate_promo_code("LIMITED", &promos, &lines, now),
            Err(PromoCodeError::UsageExhausted("LIMITED".to_string()))
        );

        Ok(())
    }

    #[test]
    fn out_of_scope_cart_warns_not_applicable() -> TestResult {
        let promos =
            [promo("MERCH")?.with_scope(PromoScope::categories([ProductCategory::Merchandise]))];
        let lines = [line("kit", ProductCategory::PlayKit)?];

        let validated = validate_promo_code("MERCH", &promos, &lines, Timestamp::now())?;

        assert_eq!(validated.warnings(), [PromoWarning::NotApplicable]);
        assert!(!validated.is_applicable());

        Ok(())
    }

    #[test]
    fn validation_does_not_touch_usage_count() -> TestResult {
        let promos = [promo("ONCE")?.with_usage(Some(1), 0)];
        let lines = [line("kit", ProductCategory::PlayKit)?];

        validate_promo_code("ONCE", &promos, &lines, Timestamp::now())?;
        validate_promo_code("ONCE", &promos, &lines, Timestamp::now())?;

        assert_eq!(promos.first().map(|p| p.usage_count), Some(0));

        Ok(())
    }

    #[test]
    fn messages_are_localized() {
        let error = PromoCodeError::NotFound("X".to_string());

        assert_eq!(error.message(Locale::Indonesian), "Kode promo tidak ditemukan.");
        assert_eq!(error.message(Locale::English), "Promo code not found.");
        assert_ne!(
            PromoWarning::NotApplicable.message(Locale::Indonesian),
            PromoWarning::NotApplicable.message(Locale::English)
        );
    }
}
