//! Money helpers
//!
//! The commerce backend and the routes take amounts as plain decimal strings in
//! major units, so these helpers turn `Money` values into the two spellings in use.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// Build money from a whole number of major units.
///
/// Saturates rather than overflowing for absurdly large inputs.
pub fn from_major(major: i64, currency: &Currency) -> Money<'_, Currency> {
    let minor = 10_i64
        .saturating_pow(currency.exponent)
        .saturating_mul(major);

    Money::from_minor(minor, currency)
}

/// Returns the amount in major units as an exact decimal.
pub fn major_units(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Format an amount without trailing zeros, e.g. `"50"` or `"49.5"`.
pub fn plain_amount(money: &Money<'_, Currency>) -> String {
    major_units(money).normalize().to_string()
}

/// Format an amount with the currency's full precision, e.g. `"540.00"`.
pub fn fixed_amount(money: &Money<'_, Currency>) -> String {
    major_units(money).to_string()
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::INR;

    use super::*;

    #[test]
    fn from_major_scales_by_exponent() {
        assert_eq!(from_major(499, INR), Money::from_minor(499_00, INR));
    }

    #[test]
    fn plain_amount_drops_trailing_zeros() {
        assert_eq!(plain_amount(&Money::from_minor(50_00, INR)), "50");
        assert_eq!(plain_amount(&Money::from_minor(49_50, INR)), "49.5");
        assert_eq!(plain_amount(&Money::from_minor(0, INR)), "0");
    }

    #[test]
    fn fixed_amount_keeps_minor_digits() {
        assert_eq!(fixed_amount(&Money::from_minor(540_00, INR)), "540.00");
        assert_eq!(fixed_amount(&Money::from_minor(5, INR)), "0.05");
    }
}
