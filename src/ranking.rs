//! Ranking
//!
//! Evaluates a coupon collection against one cart and returns the
//! applicable results ordered by discount size. Performs no I/O; the
//! collection is supplied by an external retrieval collaborator.

use jiff::Timestamp;
use rust_decimal::Decimal;

use crate::{
    calculation::{self, DiscountResult},
    carts::Cart,
    coupons::Coupon,
};

/// A coupon together with the discount it yields for a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCoupon<'a> {
    coupon: &'a Coupon,
    result: DiscountResult,
}

impl<'a> RankedCoupon<'a> {
    /// The ranked coupon.
    pub fn coupon(&self) -> &'a Coupon {
        self.coupon
    }

    /// Discount amount the coupon yields.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.result.amount()
    }

    /// The full discount computation.
    pub fn result(&self) -> &DiscountResult {
        &self.result
    }
}

/// Rank coupons by the discount they yield for the cart, largest first.
///
/// Zero-discount entries (including inapplicable coupons) are discarded.
/// Ties preserve the input collection's relative order.
#[must_use]
pub fn rank<'a>(
    coupons: impl IntoIterator<Item = &'a Coupon>,
    cart: &Cart,
    now: Timestamp,
) -> Vec<RankedCoupon<'a>> {
    let mut ranked: Vec<RankedCoupon<'a>> = coupons
        .into_iter()
        .map(|coupon| RankedCoupon {
            coupon,
            result: calculation::calculate(coupon, cart, now),
        })
        .filter(|entry| !entry.result.amount().is_zero())
        .collect();

    // `sort_by` is stable, so equal discounts keep their input order.
    ranked.sort_by(|a, b| b.discount().cmp(&a.discount()));

    ranked
}
