//! Pricing
//!
//! Derives the subtotal, delivery charge, coupon discount and payable total from
//! the current cart. Nothing here is cached: every snapshot is recomputed from the
//! cart it is given, so pricing and cart contents cannot drift apart.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{CartLineItem, CartStore},
    coupons::{Coupon, CouponBook, CouponError, normalise_code},
    money::from_major,
};

/// Orders at or above this subtotal (in major units) ship free.
pub const FREE_DELIVERY_THRESHOLD: u32 = 500;

/// Flat delivery fee (in major units) charged below the free delivery threshold.
pub const DELIVERY_FEE: u32 = 50;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error)]
pub enum PricingError {
    /// No items were provided, so currency could not be determined.
    #[error("no items provided; cannot determine currency")]
    NoItems,

    /// A line or order total does not fit in minor units.
    #[error("amount overflowed")]
    Overflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates the total price of a list of cart lines.
///
/// # Errors
///
/// - [`PricingError::NoItems`]: No lines were provided, so currency could not be determined.
/// - [`PricingError::Overflow`]: A line total overflowed.
/// - [`PricingError::Money`]: Wrapped money arithmetic or currency mismatch error.
pub fn total_price<'a>(items: &[CartLineItem<'a>]) -> Result<Money<'a, Currency>, PricingError> {
    let first = items.first().ok_or(PricingError::NoItems)?;

    items.iter().try_fold(
        Money::from_minor(0, first.unit_price().currency()),
        |acc, item| Ok(acc.add(item.line_total()?)?),
    )
}

/// Delivery pricing rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig<'a> {
    /// Subtotal at which delivery becomes free (inclusive).
    pub free_delivery_threshold: Money<'a, Currency>,

    /// Delivery fee below the threshold.
    pub delivery_fee: Money<'a, Currency>,
}

impl<'a> PricingConfig<'a> {
    /// The storefront's standard delivery rules in the given currency.
    pub fn standard(currency: &'a Currency) -> Self {
        Self {
            free_delivery_threshold: from_major(i64::from(FREE_DELIVERY_THRESHOLD), currency),
            delivery_fee: from_major(i64::from(DELIVERY_FEE), currency),
        }
    }

    /// Delivery charge for a subtotal.
    ///
    /// A negative configured fee is charged as zero.
    pub fn delivery_charge(&self, subtotal: &Money<'a, Currency>) -> Money<'a, Currency> {
        let currency = self.delivery_fee.currency();

        if subtotal.to_minor_units() >= self.free_delivery_threshold.to_minor_units() {
            Money::from_minor(0, currency)
        } else {
            Money::from_minor(self.delivery_fee.to_minor_units().max(0), currency)
        }
    }
}

/// The coupon applied to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedCoupon {
    /// Upper-cased coupon code.
    pub code: String,

    /// Whether the coupon's minimum order is met by the current subtotal.
    pub qualifies: bool,
}

/// Totals derived from a cart and an optional coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingSnapshot<'a> {
    /// Sum of all line totals.
    pub subtotal: Money<'a, Currency>,

    /// Applied coupon, if any.
    pub coupon: Option<AppliedCoupon>,

    /// Discount taken off the subtotal; zero when no coupon qualifies.
    pub coupon_discount: Money<'a, Currency>,

    /// Delivery charge, based on the undiscounted subtotal.
    pub delivery_charge: Money<'a, Currency>,

    /// Amount payable: `max(0, subtotal - coupon_discount) + delivery_charge`.
    pub final_total: Money<'a, Currency>,
}

impl PricingSnapshot<'_> {
    /// Code of the coupon contributing a discount, if any.
    pub fn qualifying_coupon(&self) -> Option<&str> {
        self.coupon
            .as_ref()
            .filter(|coupon| coupon.qualifies)
            .map(|coupon| coupon.code.as_str())
    }
}

/// Pricing engine for one shopping session.
///
/// Holds the coupon table and the currently applied coupon. The discount is
/// recomputed from the live subtotal on every quote.
#[derive(Debug, Clone)]
pub struct PricingEngine<'a> {
    config: PricingConfig<'a>,
    coupons: CouponBook<'a>,
    applied: Option<Coupon<'a>>,
}

impl<'a> PricingEngine<'a> {
    /// Create an engine with explicit rules.
    pub fn new(config: PricingConfig<'a>, coupons: CouponBook<'a>) -> Self {
        Self {
            config,
            coupons,
            applied: None,
        }
    }

    /// Standard delivery rules and coupon table in the given currency.
    pub fn standard(currency: &'a Currency) -> Self {
        Self::new(
            PricingConfig::standard(currency),
            CouponBook::standard(currency),
        )
    }

    /// Delivery rules in use.
    pub fn config(&self) -> &PricingConfig<'a> {
        &self.config
    }

    /// Currently applied coupon.
    pub fn applied_coupon(&self) -> Option<&Coupon<'a>> {
        self.applied.as_ref()
    }

    /// Apply a coupon code to the cart.
    ///
    /// A different valid code replaces the applied coupon. On any error the applied
    /// coupon is left untouched.
    ///
    /// # Errors
    ///
    /// - [`CouponError::EmptyCode`]: blank input.
    /// - [`CouponError::AlreadyApplied`]: this code is already applied.
    /// - [`CouponError::InvalidCode`]: unknown code.
    /// - [`CouponError::NotEligible`]: the subtotal is below the coupon's minimum.
    /// - [`CouponError::Pricing`]: the cart could not be priced.
    pub fn apply_coupon(
        &mut self,
        code: &str,
        cart: &CartStore<'a>,
    ) -> Result<PricingSnapshot<'a>, CouponError> {
        let normalised = normalise_code(code);

        if normalised.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        if self
            .applied
            .as_ref()
            .is_some_and(|applied| applied.code() == normalised)
        {
            return Err(CouponError::AlreadyApplied(normalised));
        }

        let coupon = self.coupons.lookup(&normalised)?.clone();
        let subtotal = cart.subtotal()?;

        coupon.ensure_eligible(&subtotal)?;

        let snapshot = self.snapshot(subtotal, Some(&coupon))?;

        self.applied = Some(coupon);

        Ok(snapshot)
    }

    /// Remove the applied coupon, returning it.
    pub fn remove_coupon(&mut self) -> Option<Coupon<'a>> {
        self.applied.take()
    }

    /// Price the cart with the applied coupon.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a total overflows or amounts are in different currencies.
    pub fn quote(&self, cart: &CartStore<'a>) -> Result<PricingSnapshot<'a>, PricingError> {
        self.snapshot(cart.subtotal()?, self.applied.as_ref())
    }

    fn snapshot(
        &self,
        subtotal: Money<'a, Currency>,
        coupon: Option<&Coupon<'a>>,
    ) -> Result<PricingSnapshot<'a>, PricingError> {
        let zero = Money::from_minor(0, subtotal.currency());

        let (applied, coupon_discount) = match coupon {
            Some(coupon) => {
                let qualifies = coupon.is_eligible(&subtotal);
                let discount = if qualifies {
                    coupon.discount_for(&subtotal)?
                } else {
                    zero
                };

                let applied = AppliedCoupon {
                    code: coupon.code().to_string(),
                    qualifies,
                };

                (Some(applied), discount)
            }
            None => (None, zero),
        };

        let delivery_charge = self.config.delivery_charge(&subtotal);

        let mut discounted = subtotal.sub(coupon_discount)?;
        if discounted.to_minor_units() < 0 {
            discounted = zero;
        }

        let final_total = discounted.add(delivery_charge)?;

        Ok(PricingSnapshot {
            subtotal,
            coupon: applied,
            coupon_discount,
            delivery_charge,
            final_total,
        })
    }
}
