//! Coupon Application
//!
//! Applies a computed discount to an immutable cart snapshot, producing a
//! deep, independently-owned annotated copy plus the coupon stamp. Pure with
//! respect to its inputs: the caller's cart and coupon are never mutated,
//! and usage counters are never touched here — that bookkeeping belongs to
//! the persistence collaborator after a successful application.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::{
    calculation::{self, DiscountDetail, DiscountResult},
    carts::{Cart, ProductId},
    coupons::{Coupon, CouponId, CouponKind},
    eligibility::Ineligibility,
};

/// Errors raised when a coupon cannot be applied to a cart.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApplicationError {
    /// The coupon is not applicable to the cart.
    #[error("cannot apply coupon {code}: {reason}")]
    NotApplicable {
        /// Redemption code of the rejected coupon.
        code: String,

        /// Why the coupon did not apply.
        reason: Ineligibility,
    },

    /// The coupon is applicable but its computed discount is zero, for
    /// example a buy-X-get-Y coupon whose get-products are all absent.
    #[error("cannot apply coupon {code}: computed discount is zero")]
    ZeroDiscount {
        /// Redemption code of the rejected coupon.
        code: String,
    },
}

/// One annotated line of an applied cart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedLineItem {
    /// Product the line refers to.
    pub product_id: ProductId,

    /// Units on the line.
    pub quantity: u32,

    /// Unit price.
    pub price: Decimal,

    /// Discount accumulated on this line.
    pub line_discount: Decimal,

    /// Line subtotal after the accumulated discount.
    pub discounted_subtotal: Decimal,

    /// Units granted free of charge. Non-zero only for buy-X-get-Y grants.
    pub free_quantity: u32,
}

/// Identification of the coupon an applied cart was priced with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouponStamp {
    /// Identifier of the applied coupon.
    pub coupon_id: CouponId,

    /// Redemption code of the applied coupon.
    pub code: String,

    /// Rule family of the applied coupon.
    pub kind: CouponKind,

    /// Total discount the coupon granted.
    pub discount: Decimal,
}

/// Deep, independently-owned copy of a cart with one coupon applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedCart {
    /// The annotated cart lines.
    pub items: Vec<AppliedLineItem>,

    /// Cart subtotal before the discount.
    pub total_price: Decimal,

    /// Total discount granted.
    pub total_discount: Decimal,

    /// `total_price - total_discount`. Not floored at zero; the per-family
    /// clamps already keep every discount within its base subtotal.
    pub final_price: Decimal,

    /// The coupon the cart was priced with.
    pub applied_coupon: CouponStamp,
}

impl AppliedCart {
    /// Amount saved by the applied coupon.
    #[must_use]
    pub fn savings(&self) -> Decimal {
        self.total_discount
    }

    /// Savings as a fraction of the pre-discount total; zero for a zero
    /// total.
    #[must_use]
    pub fn savings_fraction(&self) -> Decimal {
        if self.total_price.is_zero() {
            Decimal::ZERO
        } else {
            self.total_discount / self.total_price
        }
    }
}

/// Result of applying a coupon to a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponApplication {
    /// Annotated copy of the input cart.
    pub cart: AppliedCart,

    /// The discount computation behind the annotation.
    pub result: DiscountResult,
}

/// Apply a coupon to a cart at the given instant.
///
/// # Errors
///
/// - [`ApplicationError::NotApplicable`]: the coupon does not apply; carries
///   the underlying [`Ineligibility`] reason.
/// - [`ApplicationError::ZeroDiscount`]: the coupon applies but the computed
///   discount is zero.
pub fn apply_to_cart(
    coupon: &Coupon,
    cart: &Cart,
    now: Timestamp,
) -> Result<CouponApplication, ApplicationError> {
    let result = calculation::calculate(coupon, cart, now);

    if let Some(reason) = result.reason() {
        return Err(ApplicationError::NotApplicable {
            code: coupon.code.clone(),
            reason: reason.clone(),
        });
    }

    if result.amount().is_zero() {
        return Err(ApplicationError::ZeroDiscount {
            code: coupon.code.clone(),
        });
    }

    let mut items: Vec<AppliedLineItem> = cart
        .items()
        .iter()
        .map(|item| AppliedLineItem {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            line_discount: Decimal::ZERO,
            discounted_subtotal: item.subtotal(),
            free_quantity: 0,
        })
        .collect();

    match result.detail() {
        // Inapplicable results were rejected above; cart-wide discounts
        // carry no per-line annotation.
        DiscountDetail::Inapplicable(_) | DiscountDetail::CartWide => {}
        DiscountDetail::PerItem {
            items: discounts, ..
        } => {
            for entry in discounts {
                credit_line(&mut items, entry.product_id, entry.discount, 0);
            }
        }
        DiscountDetail::FreeItems { grants, .. } => {
            for grant in grants.iter().filter(|grant| grant.in_cart) {
                credit_line(
                    &mut items,
                    grant.product_id,
                    grant.discount,
                    grant.free_quantity,
                );
            }
        }
    }

    let total_price = result.cart_total();
    let total_discount = result.amount();

    let cart = AppliedCart {
        items,
        total_price,
        total_discount,
        final_price: total_price - total_discount,
        applied_coupon: CouponStamp {
            coupon_id: coupon.id,
            code: coupon.code.clone(),
            kind: coupon.kind(),
            discount: total_discount,
        },
    };

    Ok(CouponApplication { cart, result })
}

/// Accumulate a discount (and free units) onto the first line holding the
/// product.
fn credit_line(
    items: &mut [AppliedLineItem],
    product_id: ProductId,
    discount: Decimal,
    free_quantity: u32,
) {
    if let Some(line) = items.iter_mut().find(|line| line.product_id == product_id) {
        line.line_discount += discount;
        line.discounted_subtotal = line.price * Decimal::from(line.quantity) - line.line_discount;
        line.free_quantity = line.free_quantity.saturating_add(free_quantity);
    }
}
