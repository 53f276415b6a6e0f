//! Currency
//!
//! Indonesian Rupiah is priced in whole units; there is no fractional subunit anywhere in the
//! storefront, so every amount is a plain unsigned integer. ISO 4217 gives IDR two minor units,
//! so the storefront defines its own zero-exponent Rupiah for rendering through `rusty-money`.

use std::{fmt, ops::Deref, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::{Formatter, Money, Params, Position, define_currency_set};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO 4217 code of the only currency the storefront sells in.
pub const CURRENCY_CODE: &str = "IDR";

const CURRENCY_SYMBOL: &str = "Rp";

define_currency_set!(
    storefront {
        IDR: {
            code: "IDR",
            exponent: 0,
            locale: rusty_money::Locale::EnEu,
            minor_units: 1,
            name: "Indonesian Rupiah",
            symbol: "Rp",
            symbol_first: true,
        }
    }
);

/// Rupiah as priced by the storefront, in whole units.
pub type StorefrontCurrency = storefront::Currency;

/// An amount of Indonesian Rupiah in whole units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rupiah(u64);

impl Rupiah {
    /// Zero Rupiah.
    pub const ZERO: Self = Self(0);

    /// Creates a new amount.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the amount as a plain integer.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Checked addition; `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked multiplication by a quantity; `None` on overflow.
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(u64::from(quantity)).map(Self)
    }

    /// Subtraction floored at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// The amount as [`Money`] in the storefront's whole-unit Rupiah.
    pub fn to_money(self) -> Money<'static, StorefrontCurrency> {
        Money::from_decimal(Decimal::from(self.0), storefront::IDR)
    }

    /// Render the amount for the given locale.
    ///
    /// Indonesian uses the `Rp` symbol with dot grouping (`Rp 100.000`), English uses the ISO
    /// code with comma grouping (`IDR 100,000`).
    pub fn format(self, locale: Locale) -> String {
        let params = match locale {
            Locale::Indonesian => Params {
                digit_separator: '.',
                exponent_separator: ',',
                symbol: Some(CURRENCY_SYMBOL),
                positions: &[Position::Symbol, Position::Space, Position::Amount],
                ..whole_units()
            },
            Locale::English => Params {
                digit_separator: ',',
                exponent_separator: '.',
                code: Some(CURRENCY_CODE),
                positions: &[Position::Code, Position::Space, Position::Amount],
                ..whole_units()
            },
        };

        Formatter::money(&self.to_money(), params)
    }
}

/// Thousands grouping deep enough for any `u64`, no fractional digits.
fn whole_units() -> Params<'static> {
    Params {
        separator_pattern: &[3; 7],
        rounding: Some(0),
        ..Params::default()
    }
}

impl Deref for Rupiah {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<u64> for Rupiah {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Rupiah {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(Locale::default()))
    }
}

/// Storefront display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// Bahasa Indonesia
    #[default]
    #[serde(rename = "id")]
    Indonesian,

    /// English
    #[serde(rename = "en")]
    English,
}

impl Locale {
    /// BCP 47 language tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Locale::Indonesian => "id",
            Locale::English => "en",
        }
    }
}

/// Error returned when parsing an unknown locale tag.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown locale: {0}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id-id" => Ok(Locale::Indonesian),
            "en" | "en-us" | "en-gb" => Ok(Locale::English),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn formats_indonesian_with_dot_grouping() {
        assert_eq!(Rupiah::new(100_000).format(Locale::Indonesian), "Rp 100.000");
        assert_eq!(Rupiah::new(1_250_000).format(Locale::Indonesian), "Rp 1.250.000");
    }

    #[test]
    fn formats_english_with_comma_grouping() {
        assert_eq!(Rupiah::new(111_000).format(Locale::English), "IDR 111,000");
    }

    #[test]
    fn formats_small_amounts_without_separator() {
        assert_eq!(Rupiah::ZERO.format(Locale::Indonesian), "Rp 0");
        assert_eq!(Rupiah::new(999).format(Locale::English), "IDR 999");
    }

    #[test]
    fn formats_amounts_beyond_i64() {
        assert_eq!(
            Rupiah::new(u64::MAX).format(Locale::English),
            "IDR 18,446,744,073,709,551,615"
        );
    }

    #[test]
    fn money_uses_whole_unit_rupiah() {
        let money = Rupiah::new(250_000).to_money();

        assert_eq!(money, Money::from_minor(250_000, storefront::IDR));
        assert_eq!(*money.amount(), Decimal::from(250_000));
    }

    #[test]
    fn display_uses_default_locale() {
        assert_eq!(Rupiah::new(5_000).to_string(), "Rp 5.000");
    }

    #[test]
    fn saturating_sub_floors_at_zero() {
        assert_eq!(Rupiah::new(10).saturating_sub(Rupiah::new(25)), Rupiah::ZERO);
    }

    #[test]
    fn checked_mul_detects_overflow() {
        assert_eq!(Rupiah::new(u64::MAX).checked_mul(2), None);
        assert_eq!(Rupiah::new(3).checked_mul(4), Some(Rupiah::new(12)));
    }

    #[test]
    fn rupiah_derefs_to_u64() {
        let amount = Rupiah::new(100);

        assert_eq!(*amount, 100);
    }

    #[test]
    fn parses_locale_tags() -> TestResult {
        assert_eq!("id".parse::<Locale>()?, Locale::Indonesian);
        assert_eq!("EN".parse::<Locale>()?, Locale::English);
        assert!("fr".parse::<Locale>().is_err());

        Ok(())
    }
}
