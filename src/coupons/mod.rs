//! Coupons
//!
//! Promotional rule records. A coupon is created and validated by an external
//! admin collaborator and is read-only to this engine; `current_usage` is
//! incremented by the persistence collaborator after a successful
//! application, never here.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::carts::ProductId;

pub mod bxgy;
pub mod cart_wise;
pub mod product_wise;

pub use bxgy::{BxgyCoupon, QuantityRequirement};
pub use cart_wise::CartWiseCoupon;
pub use product_wise::{ProductDiscount, ProductWiseCoupon};

/// Coupon identifier assigned by the issuing collaborator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct CouponId(pub u64);

/// Rule family discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    /// Discount computed over the entire cart subtotal.
    CartWise,

    /// Discount restricted to a configured set of product ids.
    ProductWise,

    /// Free units of a "get" set unlocked by sufficient quantity of a
    /// "buy" set.
    Bxgy,
}

impl CouponKind {
    /// Stable string form of the rule family.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CartWise => "cart_wise",
            Self::ProductWise => "product_wise",
            Self::Bxgy => "bxgy",
        }
    }
}

/// Errors raised when constructing a structurally contradictory coupon rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// Cart-wide percentage outside the 1-100 range.
    #[error("cart-wide percentage {0} is outside the 1-100 range")]
    PercentOutOfRange(Decimal),

    /// A buy-X-get-Y rule with a repetition limit of zero.
    #[error("repetition limit must be at least 1")]
    ZeroRepetitionLimit,

    /// A quantity requirement asking for zero units.
    #[error("requirement for {0} has a zero quantity")]
    ZeroRequirementQuantity(ProductId),

    /// The same product listed twice on one side of a buy-X-get-Y rule.
    #[error("{1} appears more than once in the {0} list")]
    DuplicateRequirement(&'static str, ProductId),

    /// A product listed on both sides of a buy-X-get-Y rule.
    #[error("{0} appears in both the buy and get lists")]
    OverlappingRequirement(ProductId),
}

/// Closed set of rule families.
///
/// Collaborators hand records over with a `type` tag (`cart_wise`,
/// `product_wise`, `bxgy`); adding a family is a compile-time-checked
/// extension of every match in the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponRule {
    /// Percentage off the whole cart subtotal.
    CartWise(CartWiseCoupon),

    /// Discount on a configured set of products.
    ProductWise(ProductWiseCoupon),

    /// Buy-N-get-M-free.
    Bxgy(BxgyCoupon),
}

impl CouponRule {
    /// The rule family discriminant.
    #[must_use]
    pub fn kind(&self) -> CouponKind {
        match self {
            Self::CartWise(_) => CouponKind::CartWise,
            Self::ProductWise(_) => CouponKind::ProductWise,
            Self::Bxgy(_) => CouponKind::Bxgy,
        }
    }
}

/// A promotional rule record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Identifier assigned by the issuing collaborator.
    pub id: CouponId,

    /// Unique redemption code.
    pub code: String,

    /// Rule family and its configuration.
    #[serde(flatten)]
    pub rule: CouponRule,

    /// Minimum cart subtotal required before the coupon applies.
    #[serde(default)]
    pub min_cart_value: Option<Decimal>,

    /// Instant after which the coupon no longer applies. `None` never
    /// expires.
    #[serde(default)]
    pub expires_at: Option<Timestamp>,

    /// Whether the coupon is currently switched on.
    pub is_active: bool,

    /// Maximum number of redemptions. `None` is unlimited.
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// Redemptions recorded so far by the persistence collaborator.
    #[serde(default)]
    pub current_usage: u32,
}

impl Coupon {
    /// The rule family discriminant.
    #[must_use]
    pub fn kind(&self) -> CouponKind {
        self.rule.kind()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn kind_matches_rule_family() -> TestResult {
        let coupon = Coupon {
            id: CouponId(1),
            code: "SAVE10".into(),
            rule: CouponRule::CartWise(CartWiseCoupon::new(Decimal::from(10), None)?),
            min_cart_value: None,
            expires_at: None,
            is_active: true,
            usage_limit: None,
            current_usage: 0,
        };

        assert_eq!(coupon.kind(), CouponKind::CartWise);
        assert_eq!(coupon.kind().as_str(), "cart_wise");

        Ok(())
    }

    #[test]
    fn rule_records_round_trip_through_tagged_json() -> TestResult {
        let coupon = Coupon {
            id: CouponId(7),
            code: "B2G1".into(),
            rule: CouponRule::Bxgy(BxgyCoupon::new(
                [QuantityRequirement::new(ProductId(101), 2)],
                [QuantityRequirement::new(ProductId(201), 1)],
                3,
            )?),
            min_cart_value: None,
            expires_at: None,
            is_active: true,
            usage_limit: Some(100),
            current_usage: 4,
        };

        let json = serde_json::to_string(&coupon)?;
        let parsed: Coupon = serde_json::from_str(&json)?;

        assert!(json.contains("\"type\":\"bxgy\""));
        assert_eq!(parsed, coupon);

        Ok(())
    }

    #[test]
    fn records_deserialize_from_collaborator_json() -> TestResult {
        let json = r#"{
            "id": 12,
            "code": "TENOFF",
            "type": "cart_wise",
            "percent": 10,
            "max_discount": 500,
            "min_cart_value": 1000,
            "is_active": true,
            "usage_limit": 50,
            "current_usage": 3
        }"#;

        let coupon: Coupon = serde_json::from_str(json)?;

        assert_eq!(coupon.code, "TENOFF");
        assert_eq!(coupon.kind(), CouponKind::CartWise);
        assert_eq!(coupon.min_cart_value, Some(Decimal::from(1000)));
        assert_eq!(coupon.usage_limit, Some(50));

        Ok(())
    }
}
