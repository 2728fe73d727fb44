//! End-to-end conformance tests
//!
//! Exercises the full evaluate -> calculate -> apply pipeline and the record
//! boundary with the scenarios the engine is specified against.

use jiff::Timestamp;
use rust_decimal::Decimal;
use testresult::TestResult;
use voucher::prelude::*;

fn epoch() -> Timestamp {
    Timestamp::UNIX_EPOCH
}

fn coupon(id: u64, code: &str, rule: CouponRule) -> Coupon {
    Coupon {
        id: CouponId(id),
        code: code.into(),
        rule,
        min_cart_value: None,
        expires_at: None,
        is_active: true,
        usage_limit: None,
        current_usage: 0,
    }
}

fn cart_of(lines: &[(u64, u32, i64)]) -> Result<Cart, CartError> {
    let items: Vec<CartItem> = lines
        .iter()
        .map(|&(id, quantity, price)| CartItem::new(ProductId(id), quantity, Decimal::from(price)))
        .collect();

    Cart::new(items)
}

#[test]
fn cart_wise_below_cap_conformance() -> TestResult {
    let mut tenoff = coupon(
        1,
        "TENOFF",
        CouponRule::CartWise(CartWiseCoupon::new(
            Decimal::from(10),
            Some(Decimal::from(500)),
        )?),
    );
    tenoff.min_cart_value = Some(Decimal::from(1_000));

    let cart = cart_of(&[(101, 2, 1_000)])?;
    let application = apply_to_cart(&tenoff, &cart, epoch())?;

    assert_eq!(application.cart.total_price, Decimal::from(2_000));
    assert_eq!(application.cart.total_discount, Decimal::from(200));
    assert_eq!(application.cart.final_price, Decimal::from(1_800));

    Ok(())
}

#[test]
fn cart_wise_cap_engaged_conformance() -> TestResult {
    let tenoff = coupon(
        1,
        "TENOFF",
        CouponRule::CartWise(CartWiseCoupon::new(
            Decimal::from(10),
            Some(Decimal::from(500)),
        )?),
    );

    let cart = cart_of(&[(101, 10, 1_000)])?;
    let result = calculate(&tenoff, &cart, epoch());

    // Raw discount would be 1000.
    assert_eq!(result.amount(), Decimal::from(500));

    Ok(())
}

#[test]
fn product_wise_conformance() -> TestResult {
    let twenty = coupon(
        2,
        "TWENTY",
        CouponRule::ProductWise(ProductWiseCoupon::new(
            [ProductId(101)],
            ProductDiscount::Percentage(Decimal::from(20)),
            None,
        )),
    );

    let cart = cart_of(&[(101, 3, 500), (999, 1, 10)])?;
    let result = calculate(&twenty, &cart, epoch());

    assert_eq!(result.amount(), Decimal::from(300));

    match result.detail() {
        DiscountDetail::PerItem { items, .. } => {
            assert_eq!(items.len(), 1);
            assert_eq!(
                items.first().map(|entry| entry.product_id),
                Some(ProductId(101))
            );
        }
        other => panic!("expected PerItem, got {other:?}"),
    }

    Ok(())
}

#[test]
fn bxgy_conformance() -> TestResult {
    let b2g1 = coupon(
        3,
        "B2G1",
        CouponRule::Bxgy(BxgyCoupon::new(
            [QuantityRequirement::new(ProductId(101), 2)],
            [QuantityRequirement::new(ProductId(201), 1)],
            3,
        )?),
    );

    let cart = cart_of(&[(101, 7, 50), (201, 2, 100)])?;
    let application = apply_to_cart(&b2g1, &cart, epoch())?;

    // floor(7/2) = 3 applications entitle 3 free units of 201; only 2 are in
    // the cart, each priced 100.
    assert_eq!(application.cart.total_discount, Decimal::from(200));

    let granted = application
        .cart
        .items
        .iter()
        .find(|line| line.product_id == ProductId(201));

    assert_eq!(granted.map(|line| line.free_quantity), Some(2));
    assert_eq!(granted.map(|line| line.discounted_subtotal), Some(Decimal::ZERO));

    Ok(())
}

#[test]
fn below_minimum_flows_through_every_layer() -> TestResult {
    let mut tenoff = coupon(
        4,
        "TENOFF",
        CouponRule::CartWise(CartWiseCoupon::new(Decimal::from(10), None)?),
    );
    tenoff.min_cart_value = Some(Decimal::from(1_000));

    let cart = cart_of(&[(101, 1, 500)])?;

    let evaluation = evaluate(&tenoff, &cart, epoch());
    let reason = match evaluation {
        Err(reason) => reason,
        Ok(eligibility) => panic!("expected rejection, got {eligibility:?}"),
    };

    let rendered = reason.to_string();
    assert!(rendered.contains("500"), "missing cart total: {rendered}");
    assert!(rendered.contains("1000"), "missing minimum: {rendered}");

    let result = calculate(&tenoff, &cart, epoch());
    assert_eq!(result.amount(), Decimal::ZERO);
    assert_eq!(result.reason(), Some(&reason));

    let application = apply_to_cart(&tenoff, &cart, epoch());
    match application {
        Err(ApplicationError::NotApplicable { code, reason: cause }) => {
            assert_eq!(code, "TENOFF");
            assert_eq!(cause, reason);
        }
        other => panic!("expected NotApplicable, got {other:?}"),
    }

    Ok(())
}

#[test]
fn ranking_conformance() -> TestResult {
    let cart = cart_of(&[(101, 1, 1_000)])?;

    let five = coupon(
        1,
        "FIVE",
        CouponRule::CartWise(CartWiseCoupon::new(Decimal::from(5), None)?),
    );
    let twenty = coupon(
        2,
        "TWENTY",
        CouponRule::CartWise(CartWiseCoupon::new(Decimal::from(20), None)?),
    );
    let zero = coupon(
        3,
        "ZERO",
        CouponRule::ProductWise(ProductWiseCoupon::new(
            [ProductId(999)],
            ProductDiscount::Percentage(Decimal::from(50)),
            None,
        )),
    );

    let coupons = [five, twenty, zero];
    let ranked = rank(&coupons, &cart, epoch());

    let discounts: Vec<Decimal> = ranked.iter().map(RankedCoupon::discount).collect();

    assert_eq!(discounts, [Decimal::from(200), Decimal::from(50)]);

    Ok(())
}

#[test]
fn calculation_never_returns_a_negative_discount() -> TestResult {
    let cart = cart_of(&[(101, 2, 30), (201, 1, 45)])?;

    let rules = [
        CouponRule::CartWise(CartWiseCoupon::new(
            Decimal::from(100),
            Some(Decimal::from(10_000)),
        )?),
        CouponRule::ProductWise(ProductWiseCoupon::new(
            [ProductId(101)],
            ProductDiscount::FixedAmount(Decimal::from(500)),
            None,
        )),
        CouponRule::Bxgy(BxgyCoupon::new(
            [QuantityRequirement::new(ProductId(101), 1)],
            [QuantityRequirement::new(ProductId(201), 2)],
            5,
        )?),
    ];

    for (idx, rule) in rules.into_iter().enumerate() {
        let candidate = coupon(u64::try_from(idx)?, "GUARD", rule);
        let result = calculate(&candidate, &cart, epoch());

        assert!(result.amount() >= Decimal::ZERO, "negative discount");
        assert!(
            result.amount() <= result.cart_total(),
            "discount exceeds cart total"
        );
    }

    Ok(())
}

#[test]
fn collaborator_records_deserialize_and_evaluate() -> TestResult {
    let json = r#"{
        "id": 42,
        "code": "BUNDLE",
        "type": "bxgy",
        "buy": [{"product_id": 101, "quantity": 2}],
        "get": [{"product_id": 201, "quantity": 1}],
        "repetition_limit": 3,
        "is_active": true,
        "expires_at": "2026-12-31T23:59:59Z"
    }"#;

    let bundle: Coupon = serde_json::from_str(json)?;

    assert_eq!(bundle.kind(), CouponKind::Bxgy);

    let cart = cart_of(&[(101, 4, 50), (201, 1, 100)])?;
    let now = Timestamp::from_second(1_700_000_000)?;

    let result = calculate(&bundle, &cart, now);

    assert_eq!(result.amount(), Decimal::from(100));

    Ok(())
}

#[test]
fn expired_records_are_rejected_everywhere() -> TestResult {
    let mut tenoff = coupon(
        5,
        "TENOFF",
        CouponRule::CartWise(CartWiseCoupon::new(Decimal::from(10), None)?),
    );
    tenoff.expires_at = Some(Timestamp::from_second(1_000)?);

    let cart = cart_of(&[(101, 1, 1_000)])?;
    let now = Timestamp::from_second(2_000)?;

    assert!(!is_redeemable(&tenoff, now));
    assert_eq!(calculate(&tenoff, &cart, now).amount(), Decimal::ZERO);
    assert!(apply_to_cart(&tenoff, &cart, now).is_err());

    Ok(())
}
