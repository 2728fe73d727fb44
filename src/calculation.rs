//! Discount Calculation
//!
//! Turns an eligibility decision into a concrete discount amount with a
//! per-line breakdown. All arithmetic is exact decimal arithmetic; rounding
//! for display is a presentation concern of the caller.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::Serialize;
use smallvec::SmallVec;

use crate::{
    carts::{Cart, ProductId},
    coupons::{Coupon, CouponRule, ProductDiscount},
    eligibility::{self, Ineligibility},
};

/// Shape label of a computed discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percentage of a subtotal.
    Percentage,

    /// Fixed amount per unit.
    FixedAmount,

    /// Price credit for free units.
    FreeItems,
}

impl DiscountType {
    /// Stable string form of the label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedAmount => "fixed_amount",
            Self::FreeItems => "free_items",
        }
    }
}

/// Discount attributed to one matched cart line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemDiscount {
    /// Product the line refers to.
    pub product_id: ProductId,

    /// Units on the line.
    pub quantity: u32,

    /// Discount attributed to the line.
    pub discount: Decimal,
}

/// Free units granted for one get-side entry of a buy-X-get-Y coupon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FreeItemGrant {
    /// Product the grant refers to.
    pub product_id: ProductId,

    /// Free units the applications entitle.
    pub target_quantity: u32,

    /// Free units actually granted.
    pub free_quantity: u32,

    /// Price credit for the granted units.
    pub discount: Decimal,

    /// Whether the product was present in the cart. An absent product earns
    /// no credit; the engine never fabricates a cart line to grant it.
    pub in_cart: bool,
}

/// Per-family breakdown of a discount result.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountDetail {
    /// The coupon did not apply; the amount is zero.
    Inapplicable(Ineligibility),

    /// Percentage over the whole cart subtotal.
    CartWide,

    /// Per-line discounts on matched products.
    PerItem {
        /// Shape of the configured discount.
        discount_type: DiscountType,

        /// One entry per matched cart line.
        items: SmallVec<[ItemDiscount; 4]>,
    },

    /// Free units granted by a buy-X-get-Y coupon.
    FreeItems {
        /// Whole applications the cart supported.
        applications: u32,

        /// One entry per get-side requirement.
        grants: SmallVec<[FreeItemGrant; 4]>,
    },
}

/// Outcome of calculating a coupon against a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountResult {
    amount: Decimal,
    cart_total: Decimal,
    detail: DiscountDetail,
}

impl DiscountResult {
    fn new(amount: Decimal, cart_total: Decimal, detail: DiscountDetail) -> Self {
        Self {
            amount,
            cart_total,
            detail,
        }
    }

    fn inapplicable(cart_total: Decimal, reason: Ineligibility) -> Self {
        Self::new(Decimal::ZERO, cart_total, DiscountDetail::Inapplicable(reason))
    }

    /// Computed discount amount; zero when the coupon did not apply.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Cart subtotal the calculation was based on.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.cart_total
    }

    /// Breakdown detail.
    pub fn detail(&self) -> &DiscountDetail {
        &self.detail
    }

    /// Whether the coupon applied.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        !matches!(self.detail, DiscountDetail::Inapplicable(_))
    }

    /// The reason the coupon did not apply, when it did not.
    pub fn reason(&self) -> Option<&Ineligibility> {
        match &self.detail {
            DiscountDetail::Inapplicable(reason) => Some(reason),
            _ => None,
        }
    }

    /// Shape label of the discount, when the coupon applied.
    #[must_use]
    pub fn discount_type(&self) -> Option<DiscountType> {
        match &self.detail {
            DiscountDetail::Inapplicable(_) => None,
            DiscountDetail::CartWide => Some(DiscountType::Percentage),
            DiscountDetail::PerItem { discount_type, .. } => Some(*discount_type),
            DiscountDetail::FreeItems { .. } => Some(DiscountType::FreeItems),
        }
    }
}

/// Calculate the discount a coupon yields for a cart at the given instant.
///
/// Re-derives applicability through the eligibility predicates; an
/// ineligible coupon yields a zero amount carrying the same reason
/// [`eligibility::evaluate`] reports. Total over its inputs.
#[must_use]
pub fn calculate(coupon: &Coupon, cart: &Cart, now: Timestamp) -> DiscountResult {
    let cart_total = match eligibility::gate(coupon, cart, now) {
        Ok(cart_total) => cart_total,
        Err(reason) => return DiscountResult::inapplicable(cart.total(), reason),
    };

    match &coupon.rule {
        CouponRule::CartWise(rule) => {
            let amount = rule.discount_on(cart_total);

            DiscountResult::new(amount, cart_total, DiscountDetail::CartWide)
        }
        CouponRule::ProductWise(rule) => {
            let matches = match eligibility::matched_lines(rule, cart) {
                Ok(matches) => matches,
                Err(reason) => return DiscountResult::inapplicable(cart_total, reason),
            };

            let mut items: SmallVec<[ItemDiscount; 4]> = SmallVec::new();
            let mut amount = Decimal::ZERO;

            for item in matches.iter().filter_map(|&idx| cart.items().get(idx)) {
                let discount = rule.line_discount(item);

                amount += discount;
                items.push(ItemDiscount {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    discount,
                });
            }

            let discount_type = match rule.discount() {
                ProductDiscount::Percentage(_) => DiscountType::Percentage,
                ProductDiscount::FixedAmount(_) => DiscountType::FixedAmount,
            };

            DiscountResult::new(
                amount,
                cart_total,
                DiscountDetail::PerItem {
                    discount_type,
                    items,
                },
            )
        }
        CouponRule::Bxgy(rule) => {
            let applications = match eligibility::supported_applications(rule, cart) {
                Ok(applications) => applications,
                Err(reason) => return DiscountResult::inapplicable(cart_total, reason),
            };

            let mut grants: SmallVec<[FreeItemGrant; 4]> = SmallVec::new();
            let mut amount = Decimal::ZERO;

            for entry in rule.get() {
                let target_quantity = entry.quantity.saturating_mul(applications);

                let grant = match cart.line(entry.product_id) {
                    Some(line) => {
                        let free_quantity = target_quantity.min(line.quantity);

                        FreeItemGrant {
                            product_id: entry.product_id,
                            target_quantity,
                            free_quantity,
                            discount: line.price * Decimal::from(free_quantity),
                            in_cart: true,
                        }
                    }
                    // The product is not in the cart: the full target stays
                    // recorded but earns no credit and no fabricated line.
                    None => FreeItemGrant {
                        product_id: entry.product_id,
                        target_quantity,
                        free_quantity: target_quantity,
                        discount: Decimal::ZERO,
                        in_cart: false,
                    },
                };

                amount += grant.discount;
                grants.push(grant);
            }

            DiscountResult::new(
                amount,
                cart_total,
                DiscountDetail::FreeItems {
                    applications,
                    grants,
                },
            )
        }
    }
}
