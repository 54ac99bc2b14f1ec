//! Cart
//!
//! Session-scoped store of the line items a shopper has selected. The store is
//! created when a session starts and handed by reference to pricing and checkout;
//! totals are always derived from its current contents.

use rusty_money::{Money, iso::Currency};

use crate::{
    pricing::{PricingError, total_price},
    products::{Product, ProductId},
};

/// A single product entry in the cart with its quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem<'a> {
    id: ProductId,
    name: String,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLineItem<'a> {
    /// Backend product id of the line.
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Display name captured when the product was added.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Price of a single unit.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of units, always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the line total does not fit in minor units.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, PricingError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(PricingError::Overflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}

/// Cart Store
#[derive(Debug, Clone)]
pub struct CartStore<'a> {
    items: Vec<CartLineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> CartStore<'a> {
    /// Create an empty cart trading in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            currency,
        }
    }

    /// Add `quantity` units of a product.
    ///
    /// Adding a product that is already in the cart increments its quantity instead
    /// of creating a second line. Quantities below 1 are treated as 1.
    pub fn add_item(&mut self, product: &Product<'a>, quantity: u32) {
        let quantity = quantity.max(1);

        if let Some(existing) = self.items.iter_mut().find(|item| item.id == product.id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartLineItem {
            id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
        });
    }

    /// Add a single unit of a product.
    pub fn add_one(&mut self, product: &Product<'a>) {
        self.add_item(product, 1);
    }

    /// Replace the quantity of a line; a quantity of zero removes it.
    ///
    /// Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(id);
            return;
        }

        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity = quantity;
        }
    }

    /// Remove the line with the given id, if present.
    pub fn remove_item(&mut self, id: ProductId) {
        self.items.retain(|item| item.id != id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Line items in the order they were first added.
    pub fn items(&self) -> &[CartLineItem<'a>] {
        &self.items
    }

    /// Look up a line by product id.
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem<'a>> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of all line totals.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows or a line is priced in
    /// another currency.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        if self.is_empty() {
            return Ok(Money::from_minor(0, self.currency));
        }

        total_price(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{INR, USD};
    use testresult::TestResult;

    use super::*;

    fn attar<'a>() -> Product<'a> {
        Product::new(101, "Rose Attar", Money::from_minor(150_00, INR))
    }

    fn oud<'a>() -> Product<'a> {
        Product::new(102, "Oud Noir", Money::from_minor(300_00, INR))
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = CartStore::new(INR);

        assert!(cart.is_empty());
        assert_eq!(cart.currency(), INR);
    }

    #[test]
    fn adding_same_product_merges_lines() {
        let mut cart = CartStore::new(INR);

        cart.add_item(&attar(), 2);
        cart.add_one(&attar());

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId::new(101)).map(CartLineItem::quantity), Some(3));
    }

    #[test]
    fn zero_quantity_is_clamped_to_one() {
        let mut cart = CartStore::new(INR);

        cart.add_item(&attar(), 0);

        assert_eq!(cart.get(ProductId::new(101)).map(CartLineItem::quantity), Some(1));
    }

    #[test]
    fn items_keep_insertion_order() {
        let mut cart = CartStore::new(INR);

        cart.add_one(&oud());
        cart.add_one(&attar());
        cart.add_one(&oud());

        let ids: Vec<u64> = cart.items().iter().map(|item| item.id().get()).collect();

        assert_eq!(ids, vec![102, 101]);
    }

    #[test]
    fn remove_unknown_item_is_a_no_op() {
        let mut cart = CartStore::new(INR);
        cart.add_one(&attar());

        cart.remove_item(ProductId::new(999));

        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn set_quantity_zero_removes_line() {
        let mut cart = CartStore::new(INR);
        cart.add_one(&attar());
        cart.add_one(&oud());

        cart.set_quantity(ProductId::new(101), 0);
        cart.set_quantity(ProductId::new(102), 4);

        assert!(cart.get(ProductId::new(101)).is_none());
        assert_eq!(cart.get(ProductId::new(102)).map(CartLineItem::quantity), Some(4));
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = CartStore::new(INR);
        cart.add_one(&attar());

        cart.clear();

        assert!(cart.is_empty());
    }

    #[test]
    fn unit_count_sums_quantities() {
        let mut cart = CartStore::new(INR);
        cart.add_item(&attar(), 2);
        cart.add_item(&oud(), 3);

        assert_eq!(cart.unit_count(), 5);
    }

    #[test]
    fn subtotal_multiplies_quantities() -> TestResult {
        let mut cart = CartStore::new(INR);
        cart.add_item(&attar(), 2);
        cart.add_one(&oud());

        assert_eq!(cart.subtotal()?, Money::from_minor(600_00, INR));

        Ok(())
    }

    #[test]
    fn subtotal_of_empty_cart_is_zero() -> TestResult {
        let cart = CartStore::new(INR);

        assert_eq!(cart.subtotal()?, Money::from_minor(0, INR));

        Ok(())
    }

    #[test]
    fn subtotal_with_foreign_currency_line_errors() {
        let mut cart = CartStore::new(INR);
        cart.add_one(&attar());
        cart.add_one(&Product::new(7, "Imported", Money::from_minor(10_00, USD)));

        assert!(
            matches!(cart.subtotal(), Err(PricingError::Money(_))),
            "expected currency mismatch to surface as a money error"
        );
    }
}
