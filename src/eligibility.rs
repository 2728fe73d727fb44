//! Eligibility
//!
//! Decides whether a coupon applies to a cart, per rule family.
//! Inapplicability is always returned as data, never raised.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    carts::{Cart, CartItem, ProductId},
    coupons::{BxgyCoupon, Coupon, CouponRule, ProductWiseCoupon},
};

/// Why a coupon does not apply to a cart.
///
/// Carried as data through discount results and application errors; the
/// `Display` rendering is the caller-facing reason string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Ineligibility {
    /// The coupon is switched off.
    #[error("coupon is not active")]
    Inactive,

    /// The coupon expired before the evaluation instant.
    #[error("coupon expired at {0}")]
    Expired(Timestamp),

    /// The usage limit has been reached.
    #[error("usage limit reached ({used} of {limit} redemptions)")]
    UsageExhausted {
        /// Redemptions recorded so far.
        used: u32,

        /// Configured redemption limit.
        limit: u32,
    },

    /// The cart holds no items; its total is treated as zero.
    #[error("cart is empty")]
    EmptyCart,

    /// The cart subtotal is below the coupon's minimum.
    #[error("cart total {cart_total} is below the minimum cart value {minimum}")]
    BelowMinimum {
        /// The cart subtotal.
        cart_total: Decimal,

        /// The configured minimum.
        minimum: Decimal,
    },

    /// A product-targeted coupon with no products configured.
    #[error("no applicable products are configured")]
    NoProductsConfigured,

    /// None of the targeted products are present in the cart.
    #[error("no applicable products are present in the cart")]
    NoMatchingItems,

    /// The cart does not satisfy the buy-side requirements even once.
    #[error("buy requirements are not met by the cart")]
    BuyRequirementsUnmet,
}

/// Per-family context produced by a successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    /// A cart-wide coupon applies.
    CartWide {
        /// Cart subtotal the discount will be based on.
        cart_total: Decimal,
    },

    /// A product-targeted coupon applies.
    ProductTargeted {
        /// Cart subtotal.
        cart_total: Decimal,

        /// Indexes of the matched cart lines.
        matches: SmallVec<[usize; 4]>,

        /// Summed subtotal of the matched lines.
        matched_subtotal: Decimal,
    },

    /// A buy-X-get-Y coupon applies.
    FreeItems {
        /// Cart subtotal.
        cart_total: Decimal,

        /// Whole applications the cart supports.
        applications: u32,

        /// Product-to-quantity view of the cart.
        quantities: FxHashMap<ProductId, u32>,
    },
}

impl Eligibility {
    /// Cart subtotal the evaluation was based on.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        match self {
            Self::CartWide { cart_total }
            | Self::ProductTargeted { cart_total, .. }
            | Self::FreeItems { cart_total, .. } => *cart_total,
        }
    }
}

/// True iff the coupon is active, unexpired at `now`, and under its usage
/// limit.
#[must_use]
pub fn is_redeemable(coupon: &Coupon, now: Timestamp) -> bool {
    redeemable(coupon, now).is_ok()
}

/// Activity, expiry and usage predicate with the failing condition as data.
fn redeemable(coupon: &Coupon, now: Timestamp) -> Result<(), Ineligibility> {
    if !coupon.is_active {
        return Err(Ineligibility::Inactive);
    }

    if let Some(expires_at) = coupon.expires_at {
        if now > expires_at {
            return Err(Ineligibility::Expired(expires_at));
        }
    }

    if let Some(limit) = coupon.usage_limit {
        if coupon.current_usage >= limit {
            return Err(Ineligibility::UsageExhausted {
                used: coupon.current_usage,
                limit,
            });
        }
    }

    Ok(())
}

/// Common gate shared by every rule family: liveness, a non-empty cart, and
/// the minimum cart value. Returns the cart subtotal on success.
pub(crate) fn gate(
    coupon: &Coupon,
    cart: &Cart,
    now: Timestamp,
) -> Result<Decimal, Ineligibility> {
    redeemable(coupon, now)?;

    if cart.is_empty() {
        return Err(Ineligibility::EmptyCart);
    }

    let cart_total = cart.total();

    if let Some(minimum) = coupon.min_cart_value {
        if cart_total < minimum {
            return Err(Ineligibility::BelowMinimum {
                cart_total,
                minimum,
            });
        }
    }

    Ok(cart_total)
}

/// Indexes of the cart lines a product-targeted rule matches, with distinct
/// reasons for an unconfigured rule and an unmatched cart.
pub(crate) fn matched_lines(
    rule: &ProductWiseCoupon,
    cart: &Cart,
) -> Result<SmallVec<[usize; 4]>, Ineligibility> {
    if rule.products().is_empty() {
        return Err(Ineligibility::NoProductsConfigured);
    }

    let matches: SmallVec<[usize; 4]> = cart
        .items()
        .iter()
        .enumerate()
        .filter(|(_, item)| rule.targets(item.product_id))
        .map(|(idx, _)| idx)
        .collect();

    if matches.is_empty() {
        return Err(Ineligibility::NoMatchingItems);
    }

    Ok(matches)
}

/// Whole applications a buy-X-get-Y rule supports, or the unmet-requirements
/// reason when the cart cannot satisfy the buy side even once.
pub(crate) fn supported_applications(
    rule: &BxgyCoupon,
    cart: &Cart,
) -> Result<u32, Ineligibility> {
    let applications = rule.applications(cart);

    if applications == 0 {
        return Err(Ineligibility::BuyRequirementsUnmet);
    }

    Ok(applications)
}

/// Evaluate a coupon against a cart at the given instant.
///
/// Total over its inputs: every failure mode is returned as an
/// [`Ineligibility`] value describing the first condition that failed.
///
/// # Errors
///
/// Returns the [`Ineligibility`] reason when the coupon does not apply.
pub fn evaluate(
    coupon: &Coupon,
    cart: &Cart,
    now: Timestamp,
) -> Result<Eligibility, Ineligibility> {
    let cart_total = gate(coupon, cart, now)?;

    match &coupon.rule {
        CouponRule::CartWise(_) => Ok(Eligibility::CartWide { cart_total }),
        CouponRule::ProductWise(rule) => {
            let matches = matched_lines(rule, cart)?;

            let matched_subtotal = matches
                .iter()
                .filter_map(|&idx| cart.items().get(idx))
                .map(CartItem::subtotal)
                .sum();

            Ok(Eligibility::ProductTargeted {
                cart_total,
                matches,
                matched_subtotal,
            })
        }
        CouponRule::Bxgy(rule) => {
            let applications = supported_applications(rule, cart)?;

            Ok(Eligibility::FreeItems {
                cart_total,
                applications,
                quantities: cart.quantities(),
            })
        }
    }
}
