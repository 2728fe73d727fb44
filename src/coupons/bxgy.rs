//! Buy-X-Get-Y Coupons
//!
//! Free units of a "get" set, unlocked by sufficient quantity of a "buy"
//! set, bounded by a repetition limit.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    carts::{Cart, ProductId},
    coupons::CouponError,
};

/// One buy-side or get-side quantity requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityRequirement {
    /// Product the requirement refers to.
    pub product_id: ProductId,

    /// Units per application.
    pub quantity: u32,
}

impl QuantityRequirement {
    /// Create a new quantity requirement.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// Buy-N-get-M-free rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BxgyCoupon {
    #[serde(default)]
    buy: SmallVec<[QuantityRequirement; 2]>,

    #[serde(default)]
    get: SmallVec<[QuantityRequirement; 2]>,

    repetition_limit: u32,
}

impl BxgyCoupon {
    /// Create a new buy-X-get-Y rule.
    ///
    /// Empty buy or get lists are allowed here; they make the rule evaluate
    /// as inapplicable. Structural contradictions are rejected.
    ///
    /// # Errors
    ///
    /// - [`CouponError::ZeroRepetitionLimit`]: the repetition limit is zero.
    /// - [`CouponError::ZeroRequirementQuantity`]: a requirement asks for
    ///   zero units.
    /// - [`CouponError::DuplicateRequirement`]: a product is listed twice on
    ///   one side.
    /// - [`CouponError::OverlappingRequirement`]: a product is listed on
    ///   both sides.
    pub fn new(
        buy: impl IntoIterator<Item = QuantityRequirement>,
        get: impl IntoIterator<Item = QuantityRequirement>,
        repetition_limit: u32,
    ) -> Result<Self, CouponError> {
        let buy: SmallVec<[QuantityRequirement; 2]> = buy.into_iter().collect();
        let get: SmallVec<[QuantityRequirement; 2]> = get.into_iter().collect();

        if repetition_limit == 0 {
            return Err(CouponError::ZeroRepetitionLimit);
        }

        check_side("buy", &buy)?;
        check_side("get", &get)?;

        if let Some(requirement) = buy
            .iter()
            .find(|requirement| get.iter().any(|g| g.product_id == requirement.product_id))
        {
            return Err(CouponError::OverlappingRequirement(requirement.product_id));
        }

        Ok(Self {
            buy,
            get,
            repetition_limit,
        })
    }

    /// The buy-side requirements.
    pub fn buy(&self) -> &[QuantityRequirement] {
        &self.buy
    }

    /// The get-side requirements.
    pub fn get(&self) -> &[QuantityRequirement] {
        &self.get
    }

    /// Maximum number of applications per cart.
    pub fn repetition_limit(&self) -> u32 {
        self.repetition_limit
    }

    /// Number of whole applications the cart supports.
    ///
    /// The minimum over all buy requirements of `floor(cart quantity /
    /// required quantity)`, clamped to the repetition limit. Zero when
    /// either side is empty or any buy requirement is absent from the cart.
    #[must_use]
    pub fn applications(&self, cart: &Cart) -> u32 {
        if self.buy.is_empty() || self.get.is_empty() {
            return 0;
        }

        let possible = self
            .buy
            .iter()
            .map(|requirement| {
                if requirement.quantity == 0 {
                    0
                } else {
                    cart.quantity_of(requirement.product_id) / requirement.quantity
                }
            })
            .min()
            .unwrap_or(0);

        possible.min(self.repetition_limit)
    }
}

/// Reject zero quantities and duplicate products within one side.
fn check_side(side: &'static str, requirements: &[QuantityRequirement]) -> Result<(), CouponError> {
    for (i, requirement) in requirements.iter().enumerate() {
        if requirement.quantity == 0 {
            return Err(CouponError::ZeroRequirementQuantity(requirement.product_id));
        }

        if requirements
            .iter()
            .take(i)
            .any(|other| other.product_id == requirement.product_id)
        {
            return Err(CouponError::DuplicateRequirement(
                side,
                requirement.product_id,
            ));
        }
    }

    Ok(())
}
