//! # Cart
//!
//! In-memory cart for the quick-sale counter ("caixa rápido").
//!
//! Nothing here touches stock: the cart only checks that the requested
//! quantity is available when an item is added. Stock is taken when the
//! sale is finalized, inside the same transaction that writes the sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator Action          Cart Method             Effect                │
//! │  ───────────────          ───────────             ──────                │
//! │                                                                         │
//! │  Click product ──────────► add_item(p, 1) ──────► push or qty += 1      │
//! │  "+" button ─────────────► add_item(p, 1) ──────► qty += 1              │
//! │  "−" button ─────────────► decrement(id) ───────► qty -= 1 (0 removes)  │
//! │  Trash icon ─────────────► remove_item(id) ─────► line removed          │
//! │  Finalize OK ────────────► clear() ─────────────► empty                 │
//! │                                                                         │
//! │  Every add re-checks: qty already in cart + requested ≤ product.stock   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::{validate_cart_size, validate_quantity};
use crate::MAX_ITEM_QUANTITY;

/// A line in the cart.
///
/// Name and unit price are frozen from the product when the line is first
/// created. Later price changes in the catalog do not affect this line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// `unit_price × quantity`.
    #[inline]
    pub fn subtotal(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

/// The quick-sale cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every line has `quantity > 0`
/// - Lines keep insertion order
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` units of `product`, merging into an existing line.
    ///
    /// ## Errors
    /// - `Validation` when `quantity` is not in `1..=999`
    /// - `InsufficientStock` when the cart would hold more than the stock
    /// - `QuantityTooLarge` when the merged line would exceed 999
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let in_cart = self.quantity_of(&product.id);
        let wanted = in_cart + quantity;

        if !product.can_sell(wanted) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock - in_cart,
                requested: quantity,
            });
        }

        if wanted > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: wanted,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = wanted;
            return Ok(());
        }

        validate_cart_size(self.lines.len())?;
        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Takes one unit off a line. The line is removed when it reaches zero.
    pub fn decrement(&mut self, product_id: &str) -> CoreResult<()> {
        let idx = self.position(product_id)?;
        if self.lines[idx].quantity <= 1 {
            self.lines.remove(idx);
        } else {
            self.lines[idx].quantity -= 1;
        }
        Ok(())
    }

    /// Removes a line entirely.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<CartLine> {
        let idx = self.position(product_id)?;
        Ok(self.lines.remove(idx))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of `product_id` currently in the cart (0 if absent).
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line subtotals.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, product_id: &str) -> CoreResult<usize> {
        self.lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or_else(|| CoreError::ItemNotInCart(product_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Produto {}", id),
            category_id: None,
            category_name: None,
            cost_cents: price_cents / 2,
            price_cents,
            stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::new();
        let beer = product("1", 1200, 10);

        cart.add_item(&beer, 2).unwrap();
        cart.add_item(&beer, 1).unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of("1"), 3);
        assert_eq!(cart.total().cents(), 3600);
    }

    #[test]
    fn test_add_respects_stock_including_cart() {
        let mut cart = Cart::new();
        let wine = product("1", 4500, 2);

        cart.add_item(&wine, 2).unwrap();
        let err = cart.add_item(&wine, 1).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 0,
                requested: 1,
                ..
            }
        ));
        assert_eq!(cart.quantity_of("1"), 2);
    }

    #[test]
    fn test_add_out_of_stock() {
        let mut cart = Cart::new();
        let gin = product("1", 9000, 0);
        assert!(cart.add_item(&gin, 1).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_price_frozen_on_first_add() {
        let mut cart = Cart::new();
        let mut beer = product("1", 1000, 10);

        cart.add_item(&beer, 1).unwrap();
        beer.price_cents = 1500;
        cart.add_item(&beer, 1).unwrap();

        assert_eq!(cart.lines()[0].unit_price_cents, 1000);
        assert_eq!(cart.total().cents(), 2000);
    }

    #[test]
    fn test_decrement_removes_at_zero() {
        let mut cart = Cart::new();
        let beer = product("1", 1000, 10);
        cart.add_item(&beer, 2).unwrap();

        cart.decrement("1").unwrap();
        assert_eq!(cart.quantity_of("1"), 1);

        cart.decrement("1").unwrap();
        assert!(cart.is_empty());

        assert!(matches!(
            cart.decrement("1"),
            Err(CoreError::ItemNotInCart(_))
        ));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&product("1", 1000, 10), 1).unwrap();
        cart.add_item(&product("2", 550, 10), 3).unwrap();
        assert_eq!(cart.total_quantity(), 4);

        let removed = cart.remove_item("1").unwrap();
        assert_eq!(removed.product_id, "1");
        assert_eq!(cart.total().cents(), 1650);

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.total().is_zero());
    }

    #[test]
    fn test_invalid_quantity() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add_item(&product("1", 1000, 10), 0),
            Err(CoreError::Validation(_))
        ));
    }
}
