//! Receipt
//!
//! Renders a priced cart as a terminal table followed by a totals summary.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::CartStore, pricing::{PricingError, PricingSnapshot}};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Output could not be written.
    #[error("failed to write receipt")]
    IO,

    /// A line could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Write the cart lines and totals.
///
/// # Errors
///
/// Returns an error if a line total overflows or the output cannot be written.
pub fn write_to(
    mut out: impl io::Write,
    cart: &CartStore<'_>,
    snapshot: &PricingSnapshot<'_>,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Unit Price", "Qty", "Line Total"]);

    for (index, item) in cart.items().iter().enumerate() {
        builder.push_record([
            format!("#{}", index + 1),
            item.name().to_string(),
            item.unit_price().to_string(),
            item.quantity().to_string(),
            item.line_total()?.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

    write_summary(&mut out, snapshot)
}

fn write_summary(out: &mut impl io::Write, snapshot: &PricingSnapshot<'_>) -> Result<(), ReceiptError> {
    let coupon_label = match &snapshot.coupon {
        Some(coupon) if coupon.qualifies => format!("Coupon ({}):", coupon.code),
        Some(coupon) => format!("Coupon ({}, not eligible):", coupon.code),
        None => "Coupon:".to_string(),
    };

    let delivery = if snapshot.delivery_charge.to_minor_units() == 0 {
        "FREE".to_string()
    } else {
        snapshot.delivery_charge.to_string()
    };

    let lines = [
        ("Subtotal:".to_string(), snapshot.subtotal.to_string()),
        (coupon_label, format!("-{}", snapshot.coupon_discount)),
        ("Delivery:".to_string(), delivery),
        ("Total:".to_string(), snapshot.final_total.to_string()),
    ];

    let label_width = lines.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    let value_width = lines.iter().map(|(_, value)| value.chars().count()).max().unwrap_or(0);

    for (label, value) in &lines {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}").map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}
