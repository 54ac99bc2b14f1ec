//! Cart fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, INR, USD},
};
use serde::Deserialize;

use crate::{cart::CartStore, fixtures::FixtureError, products::Product};

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Currency of the cart, e.g. `INR`
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Lines in the order they are added
    pub items: Vec<CartItemFixture>,

    /// Coupon code to apply, if any
    #[serde(default)]
    pub coupon: Option<String>,
}

/// Cart line fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CartItemFixture {
    /// Backend product id
    pub id: u64,

    /// Product name
    pub name: String,

    /// Unit price (e.g., "299 INR")
    pub price: String,

    /// Units to add
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_quantity() -> u32 {
    1
}

impl CartFixture {
    /// Build a cart from the fixture.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a price is malformed or in a different currency
    /// from the cart.
    pub fn into_cart(self) -> Result<CartStore<'static>, FixtureError> {
        let currency = parse_currency(&self.currency)?;
        let mut cart = CartStore::new(currency);

        for item in self.items {
            let (minor, price_currency) = parse_price(&item.price)?;

            if price_currency != currency {
                return Err(FixtureError::CurrencyMismatch(
                    currency.iso_alpha_code.to_string(),
                    price_currency.iso_alpha_code.to_string(),
                ));
            }

            let product = Product::new(item.id, item.name, Money::from_minor(minor, price_currency));

            cart.add_item(&product, item.quantity);
        }

        Ok(cart)
    }
}

/// Look up a supported currency by ISO code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for codes the storefront does not trade in.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "INR" => Ok(INR),
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Parse a price string like "299 INR" or "1.50 GBP" into minor units and currency.
///
/// # Errors
///
/// Returns a [`FixtureError`] if the format is invalid, the amount cannot be represented
/// in minor units, or the currency is unknown.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(code)?;

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let scale = 10_i64
        .checked_pow(currency.exponent)
        .map(Decimal::from)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(scale)
        .filter(|value| value.fract().is_zero() && !value.is_sign_negative())
        .and_then(|value| value.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}
