//! Products

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

/// Identifier of a product on the commerce backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a backend product id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw backend id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Backend product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product price
    pub price: Money<'a, Currency>,
}

impl<'a> Product<'a> {
    /// Create a new product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}
