//! Coupons
//!
//! Coupons come from a fixed table owned by the storefront. Each entry pairs a
//! code with an eligibility rule (an optional minimum order value) and a discount
//! rule evaluated against the subtotal it is applied to.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    money::{from_major, plain_amount},
    pricing::PricingError,
};

/// Minimum order value, in major units, for the `FIRST10` coupon.
pub const FIRST_ORDER_MINIMUM: i64 = 499;

/// Reasons a coupon code is rejected.
///
/// All of these are recoverable; a rejected code never changes the applied coupon.
#[derive(Debug, Error)]
pub enum CouponError {
    /// Nothing was entered.
    #[error("Please enter a coupon code")]
    EmptyCode,

    /// No coupon with this code exists.
    #[error("Invalid coupon code")]
    InvalidCode(String),

    /// The coupon exists but the order is below its minimum value.
    #[error("Minimum order {minimum} required for {code}")]
    NotEligible {
        /// Normalised coupon code.
        code: String,

        /// Minimum order value, formatted in major units.
        minimum: String,
    },

    /// This coupon is already applied to the cart.
    #[error("Coupon already applied")]
    AlreadyApplied(String),

    /// The cart could not be priced while evaluating the coupon.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// How a coupon reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CouponDiscount {
    /// Take a percentage off the subtotal, rounded to whole currency units.
    PercentageOff(Percentage),
}

/// A named discount rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Coupon<'a> {
    code: String,
    discount: CouponDiscount,
    minimum_order: Option<Money<'a, Currency>>,
}

impl<'a> Coupon<'a> {
    /// Create a coupon; the code is stored upper-cased.
    pub fn new(
        code: &str,
        discount: CouponDiscount,
        minimum_order: Option<Money<'a, Currency>>,
    ) -> Self {
        Self {
            code: normalise_code(code),
            discount,
            minimum_order,
        }
    }

    /// Upper-cased coupon code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Discount rule.
    pub fn discount(&self) -> CouponDiscount {
        self.discount
    }

    /// Minimum subtotal required, if any.
    pub fn minimum_order(&self) -> Option<&Money<'a, Currency>> {
        self.minimum_order.as_ref()
    }

    /// Check whether the coupon may be used against this subtotal.
    pub fn is_eligible(&self, subtotal: &Money<'_, Currency>) -> bool {
        self.minimum_order
            .is_none_or(|minimum| subtotal.to_minor_units() >= minimum.to_minor_units())
    }

    /// Check eligibility, reporting the minimum when it is not met.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NotEligible`] if the subtotal is below the minimum order.
    pub fn ensure_eligible(&self, subtotal: &Money<'_, Currency>) -> Result<(), CouponError> {
        match self.minimum_order {
            Some(minimum) if !self.is_eligible(subtotal) => Err(CouponError::NotEligible {
                code: self.code.clone(),
                minimum: plain_amount(&minimum),
            }),
            _ => Ok(()),
        }
    }

    /// Discount this coupon gives on `subtotal`.
    ///
    /// The result is never negative and never larger than the subtotal. Eligibility
    /// is not checked here.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::PercentConversion`] if the percentage cannot be
    /// represented in minor units.
    pub fn discount_for<'b>(
        &self,
        subtotal: &Money<'b, Currency>,
    ) -> Result<Money<'b, Currency>, PricingError> {
        let subtotal_minor = subtotal.to_minor_units().max(0);

        let discount_minor = match self.discount {
            CouponDiscount::PercentageOff(percent) => {
                percent_of_minor(&percent, subtotal_minor, subtotal.currency().exponent)?
            }
        };

        Ok(Money::from_minor(
            discount_minor.clamp(0, subtotal_minor),
            subtotal.currency(),
        ))
    }
}

/// The fixed table of coupons the storefront accepts.
#[derive(Debug, Clone, Default)]
pub struct CouponBook<'a> {
    coupons: Vec<Coupon<'a>>,
}

impl<'a> CouponBook<'a> {
    /// Create a book from explicit coupons.
    pub fn new(coupons: impl Into<Vec<Coupon<'a>>>) -> Self {
        Self {
            coupons: coupons.into(),
        }
    }

    /// The storefront's standard coupons: `FIRST10` (10% off orders of 499 or more)
    /// and `WELCOME10` (10% off, no minimum).
    pub fn standard(currency: &'a Currency) -> Self {
        let ten_percent = CouponDiscount::PercentageOff(Percentage::from(Decimal::new(10, 2)));

        Self::new([
            Coupon::new(
                "FIRST10",
                ten_percent,
                Some(from_major(FIRST_ORDER_MINIMUM, currency)),
            ),
            Coupon::new("WELCOME10", ten_percent, None),
        ])
    }

    /// Find a coupon by code, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::EmptyCode`] for blank input and
    /// [`CouponError::InvalidCode`] if no coupon matches.
    pub fn lookup(&self, code: &str) -> Result<&Coupon<'a>, CouponError> {
        let code = normalise_code(code);

        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        self.coupons
            .iter()
            .find(|coupon| coupon.code == code)
            .ok_or(CouponError::InvalidCode(code))
    }

    /// Number of coupons in the book.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if the book has no coupons.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

/// Upper-case and trim a coupon code for comparison.
pub fn normalise_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Percentage of a minor-unit amount, rounded half away from zero to whole major units.
fn percent_of_minor(percent: &Percentage, minor: i64, exponent: u32) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;
    let scale = 10_i64
        .checked_pow(exponent)
        .and_then(Decimal::from_i64)
        .ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .and_then(|applied| applied.checked_div(scale))
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(scale)
        .and_then(|rounded| rounded.to_i64())
        .ok_or(PricingError::PercentConversion)
}
