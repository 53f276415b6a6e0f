//! Receipt
//!
//! Terminal rendering of a priced cart.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    currency::{Locale, Rupiah},
    pricing::{PricedCart, PricedLine},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

struct Labels {
    product: &'static str,
    quantity: &'static str,
    unit_price: &'static str,
    subtotal: &'static str,
    tax: &'static str,
    discount: &'static str,
    total: &'static str,
    empty: &'static str,
}

const fn labels(locale: Locale) -> Labels {
    match locale {
        Locale::Indonesian => Labels {
            product: "Produk",
            quantity: "Jml",
            unit_price: "Harga",
            subtotal: "Subtotal",
            tax: "Pajak",
            discount: "Diskon",
            total: "Total",
            empty: "Keranjang kosong.",
        },
        Locale::English => Labels {
            product: "Product",
            quantity: "Qty",
            unit_price: "Price",
            subtotal: "Subtotal",
            tax: "Tax",
            discount: "Discount",
            total: "Total",
            empty: "Cart is empty.",
        },
    }
}

/// Write a priced cart as a table followed by its totals.
///
/// # Errors
///
/// Returns [`ReceiptError::Io`] if the output cannot be written.
pub fn write_receipt(
    mut out: impl io::Write,
    priced: &PricedCart,
    locale: Locale,
) -> Result<(), ReceiptError> {
    let labels = labels(locale);

    if priced.is_empty() {
        writeln!(out, "{}", labels.empty)?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record([
        "",
        labels.product,
        labels.quantity,
        labels.unit_price,
        labels.subtotal,
        labels.tax,
        labels.discount,
    ]);

    for (idx, line) in priced.lines().iter().enumerate() {
        builder.push_record(line_cells(idx, line, locale));
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..7), Alignment::right());

    writeln!(out, "\n{table}")?;

    let discount_label = match priced.promo_code() {
        Some(code) => format!("{} ({code})", labels.discount),
        None => labels.discount.to_string(),
    };

    let summary = [
        (labels.subtotal.to_string(), priced.subtotal()),
        (labels.tax.to_string(), priced.tax_amount()),
        (discount_label, priced.discount_amount()),
        (labels.total.to_string(), priced.total()),
    ];

    let label_width = summary
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or_default();

    let values: Vec<String> = summary
        .iter()
        .map(|(_, amount)| amount.format(locale))
        .collect();

    let value_width = values.iter().map(String::len).max().unwrap_or_default();

    for ((label, _), value) in summary.iter().zip(&values) {
        writeln!(out, " {label:<label_width$}  {value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}

fn line_cells(idx: usize, line: &PricedLine, locale: Locale) -> [String; 7] {
    let discount = if line.discount_amount == Rupiah::ZERO {
        String::new()
    } else {
        format!("-{}", line.discount_amount.format(locale))
    };

    [
        format!("#{:<3}", idx + 1),
        line.product_name.clone(),
        line.quantity.to_string(),
        line.unit_price.format(locale),
        line.subtotal.format(locale),
        line.tax_amount.format(locale),
        discount,
    ]
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        cart::CartLine,
        pricing::price_cart,
        products::{Product, ProductCategory, ProductId, TaxRate},
        promotions::{DiscountPercentage, PromoCode},
    };

    use super::*;

    fn priced(promo: Option<&PromoCode>) -> TestResult<PricedCart> {
        let lines = [CartLine {
            product: Product {
                id: ProductId::from("kit"),
                name: "Sensory Play Kit".to_string(),
                price: Rupiah::new(100_000),
                tax_rate: TaxRate::from_points(11)?,
                stock: 5,
                category: ProductCategory::PlayKit,
            },
            quantity: 1,
        }];

        Ok(price_cart(&lines, promo, Timestamp::now())?)
    }

    #[test]
    fn renders_lines_and_indonesian_totals() -> TestResult {
        let promo = PromoCode::new("HEMAT10", DiscountPercentage::new(10)?);
        let mut out = Vec::new();

        write_receipt(&mut out, &priced(Some(&promo))?, Locale::Indonesian)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Sensory Play Kit"));
        assert!(output.contains("Diskon (HEMAT10)"));
        assert!(output.contains("Rp 101.000"));
        assert!(output.contains("-Rp 10.000"));

        Ok(())
    }

    #[test]
    fn renders_english_labels() -> TestResult {
        let mut out = Vec::new();

        write_receipt(&mut out, &priced(None)?, Locale::English)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Qty"));
        assert!(output.contains("IDR 111,000"));
        assert!(!output.contains("Discount ("));

        Ok(())
    }

    #[test]
    fn empty_cart_prints_notice() -> TestResult {
        let empty = price_cart(&[], None, Timestamp::now())?;
        let mut out = Vec::new();

        write_receipt(&mut out, &empty, Locale::English)?;

        assert_eq!(String::from_utf8(out)?, "Cart is empty.\n");

        Ok(())
    }
}
