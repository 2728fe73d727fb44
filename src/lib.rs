//! Voucher
//!
//! Voucher is a coupon eligibility and discount determination engine: given a promotional rule
//! and a cart snapshot, it decides whether the rule applies and computes the resulting price
//! adjustment for cart-wide, product-targeted and buy-X-get-Y rule families.

pub mod application;
pub mod calculation;
pub mod carts;
pub mod coupons;
pub mod eligibility;
pub mod prelude;
pub mod ranking;
