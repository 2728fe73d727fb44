//! Cart-Wide Coupons
//!
//! A percentage discount on the entire cart subtotal, optionally capped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::coupons::CouponError;

/// Percentage discount over the whole cart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartWiseCoupon {
    percent: Decimal,

    #[serde(default)]
    max_discount: Option<Decimal>,
}

impl CartWiseCoupon {
    /// Create a new cart-wide rule.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::PercentOutOfRange`] if `percent` is outside
    /// the 1-100 range.
    pub fn new(percent: Decimal, max_discount: Option<Decimal>) -> Result<Self, CouponError> {
        if percent < Decimal::ONE || percent > Decimal::ONE_HUNDRED {
            return Err(CouponError::PercentOutOfRange(percent));
        }

        Ok(Self {
            percent,
            max_discount,
        })
    }

    /// The configured percentage (1-100).
    pub fn percent(&self) -> Decimal {
        self.percent
    }

    /// The discount cap, if any.
    pub fn max_discount(&self) -> Option<Decimal> {
        self.max_discount
    }

    /// Discount amount for a cart subtotal.
    ///
    /// The percentage of the subtotal, bounded by `max_discount` when set,
    /// and never more than the subtotal itself. Exact decimal arithmetic;
    /// no rounding.
    #[must_use]
    pub fn discount_on(&self, cart_total: Decimal) -> Decimal {
        let mut discount = cart_total * self.percent / Decimal::ONE_HUNDRED;

        if let Some(cap) = self.max_discount {
            discount = discount.min(cap);
        }

        discount.min(cart_total)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percent_below_one_errors() {
        let result = CartWiseCoupon::new(Decimal::ZERO, None);

        assert_eq!(
            result,
            Err(CouponError::PercentOutOfRange(Decimal::ZERO))
        );
    }

    #[test]
    fn percent_above_one_hundred_errors() {
        let percent = Decimal::from(101);
        let result = CartWiseCoupon::new(percent, None);

        assert_eq!(result, Err(CouponError::PercentOutOfRange(percent)));
    }

    #[test]
    fn discount_on_takes_percentage_of_total() -> TestResult {
        let rule = CartWiseCoupon::new(Decimal::from(10), None)?;

        assert_eq!(rule.discount_on(Decimal::from(2000)), Decimal::from(200));

        Ok(())
    }

    #[test]
    fn discount_on_engages_cap() -> TestResult {
        let rule = CartWiseCoupon::new(Decimal::from(10), Some(Decimal::from(500)))?;

        // Raw discount would be 1000.
        assert_eq!(rule.discount_on(Decimal::from(10_000)), Decimal::from(500));

        Ok(())
    }

    #[test]
    fn discount_on_never_exceeds_total() -> TestResult {
        let rule = CartWiseCoupon::new(Decimal::from(100), Some(Decimal::from(5000)))?;

        assert_eq!(rule.discount_on(Decimal::from(80)), Decimal::from(80));

        Ok(())
    }

    #[test]
    fn discount_on_keeps_exact_fractions() -> TestResult {
        let rule = CartWiseCoupon::new(Decimal::from(15), None)?;

        // 15% of 99 = 14.85, carried exactly.
        assert_eq!(rule.discount_on(Decimal::from(99)), Decimal::new(1485, 2));

        Ok(())
    }
}
