//! Fixtures
//!
//! YAML files describing carts and customers, used by the operator CLI.

use std::{fs, path::Path};

use thiserror::Error;

use crate::checkout::ShippingForm;

pub mod cart;

pub use cart::{CartFixture, CartItemFixture, parse_currency, parse_price};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between the cart and a line
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),
}

/// Load a cart fixture from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_cart(path: impl AsRef<Path>) -> Result<CartFixture, FixtureError> {
    let contents = fs::read_to_string(path)?;

    Ok(serde_norway::from_str(&contents)?)
}

/// Load a customer's shipping details from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_customer(path: impl AsRef<Path>) -> Result<ShippingForm, FixtureError> {
    let contents = fs::read_to_string(path)?;

    Ok(serde_norway::from_str(&contents)?)
}
