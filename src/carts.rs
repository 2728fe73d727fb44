//! Carts
//!
//! Per-request cart snapshots that coupons are evaluated against. A cart is
//! an ephemeral value: the engine never persists or aliases one.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Product identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product {}", self.0)
    }
}

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// An item has a zero quantity (index, product id).
    #[error("item {0} ({1}) has a zero quantity")]
    ZeroQuantity(usize, ProductId),

    /// An item has a zero or negative price (index, product id).
    #[error("item {0} ({1}) has a non-positive price")]
    NonPositivePrice(usize, ProductId),
}

/// A single cart line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this line refers to.
    pub product_id: ProductId,

    /// Number of units on the line.
    pub quantity: u32,

    /// Unit price.
    pub price: Decimal,
}

impl CartItem {
    /// Create a new cart line.
    pub fn new(product_id: ProductId, quantity: u32, price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            price,
        }
    }

    /// Line subtotal (unit price times quantity).
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// An immutable cart snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create a cart from the given lines.
    ///
    /// An empty cart is structurally valid; it evaluates as inapplicable for
    /// every coupon rather than erroring here.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if any line has a zero quantity or a
    /// non-positive price.
    pub fn new(items: impl Into<Vec<CartItem>>) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            if item.quantity == 0 {
                Err(CartError::ZeroQuantity(i, item.product_id))
            } else if item.price <= Decimal::ZERO {
                Err(CartError::NonPositivePrice(i, item.product_id))
            } else {
                Ok(())
            }
        })?;

        Ok(Cart { items })
    }

    /// The cart lines.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Calculate the cart subtotal over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Total quantity of a product across all lines.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .filter(|item| item.product_id == product_id)
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// First line holding the given product, if any.
    pub fn line(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Product-to-quantity view of the cart.
    #[must_use]
    pub fn quantities(&self) -> FxHashMap<ProductId, u32> {
        let mut map = FxHashMap::default();

        for item in &self.items {
            let entry = map.entry(item.product_id).or_insert(0u32);
            *entry = entry.saturating_add(item.quantity);
        }

        map
    }
}
