//! Product-Targeted Coupons
//!
//! A percentage or fixed-amount discount restricted to a configured set of
//! product ids.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::carts::{CartItem, ProductId};

/// Discount shape for product-targeted coupons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "discount_type", content = "discount_value", rename_all = "snake_case")]
pub enum ProductDiscount {
    /// Percentage off each matched line's subtotal.
    Percentage(Decimal),

    /// Fixed amount off every unit of a matched line.
    FixedAmount(Decimal),
}

/// Discount on a configured set of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWiseCoupon {
    #[serde(default)]
    products: Vec<ProductId>,

    #[serde(flatten)]
    discount: ProductDiscount,

    #[serde(default)]
    max_discount: Option<Decimal>,
}

impl ProductWiseCoupon {
    /// Create a new product-targeted rule.
    ///
    /// A missing product list is treated as empty; it renders the coupon
    /// inapplicable at evaluation time rather than erroring here.
    pub fn new(
        products: impl Into<Vec<ProductId>>,
        discount: ProductDiscount,
        max_discount: Option<Decimal>,
    ) -> Self {
        Self {
            products: products.into(),
            discount,
            max_discount,
        }
    }

    /// The targeted product ids.
    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    /// The configured discount shape.
    pub fn discount(&self) -> ProductDiscount {
        self.discount
    }

    /// The per-line discount cap, if any.
    pub fn max_discount(&self) -> Option<Decimal> {
        self.max_discount
    }

    /// Whether the given product is targeted by this coupon.
    #[must_use]
    pub fn targets(&self, product_id: ProductId) -> bool {
        self.products.contains(&product_id)
    }

    /// Discount for one matched cart line.
    ///
    /// `max_discount` bounds every matched line independently, not the
    /// aggregate. The result is clamped to the line's own subtotal. Exact
    /// decimal arithmetic; no rounding.
    #[must_use]
    pub fn line_discount(&self, item: &CartItem) -> Decimal {
        let raw = match self.discount {
            ProductDiscount::Percentage(percent) => {
                item.subtotal() * percent / Decimal::ONE_HUNDRED
            }
            ProductDiscount::FixedAmount(amount) => amount * Decimal::from(item.quantity),
        };

        let capped = match self.max_discount {
            Some(cap) => raw.min(cap),
            None => raw,
        };

        capped.min(item.subtotal())
    }
}
