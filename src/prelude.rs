//! Voucher prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    application::{
        ApplicationError, AppliedCart, AppliedLineItem, CouponApplication, CouponStamp,
        apply_to_cart,
    },
    calculation::{
        DiscountDetail, DiscountResult, DiscountType, FreeItemGrant, ItemDiscount, calculate,
    },
    carts::{Cart, CartError, CartItem, ProductId},
    coupons::{
        BxgyCoupon, CartWiseCoupon, Coupon, CouponError, CouponId, CouponKind, CouponRule,
        ProductDiscount, ProductWiseCoupon, QuantityRequirement,
    },
    eligibility::{Eligibility, Ineligibility, evaluate, is_redeemable},
    ranking::{RankedCoupon, rank},
};
