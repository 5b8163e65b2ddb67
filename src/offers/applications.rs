//! Offer Applications

use rusty_money::{Money, MoneyError, iso::Currency};

use crate::{
    allocation::{AllocatedGroup, Allocation},
    offers::{OfferKey, matcher::MatchedLines},
    pricing::ResolvedPrice,
};

/// An offer that applies to the cart, with its quantities split into bundled
/// and standard-priced groups.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOffer<'a> {
    /// Key of the offer that applied
    pub offer_key: OfferKey,

    /// Cart lines the offer matched
    pub matched: MatchedLines,

    /// Bundle unit price and how it was resolved
    pub price: ResolvedPrice<'a>,

    /// Units priced as part of a complete bundle
    pub bundled: AllocatedGroup<'a>,

    /// Matched units left at their standard price
    pub standard: AllocatedGroup<'a>,

    /// Number of complete bundles
    pub bundle_count: u64,

    /// Revenue from the bundles (`bundle_count` x bundle unit price)
    pub bundle_total: Money<'a, Currency>,
}

impl<'a> AppliedOffer<'a> {
    /// Assemble an application from the stage outputs.
    pub fn new(
        offer_key: OfferKey,
        matched: MatchedLines,
        price: ResolvedPrice<'a>,
        allocation: Allocation<'a>,
    ) -> Self {
        Self {
            offer_key,
            matched,
            price,
            bundled: allocation.bundled,
            standard: allocation.standard,
            bundle_count: allocation.bundle_count,
            bundle_total: allocation.bundle_total,
        }
    }

    /// Price of one bundle.
    pub fn bundle_unit_price(&self) -> Money<'a, Currency> {
        self.price.unit_price
    }

    /// Revenue from matched units left at their standard price.
    pub fn standard_total(&self) -> Money<'a, Currency> {
        self.standard.total()
    }

    /// Value of the bundled units at their original prices.
    pub fn bundled_original_total(&self) -> Money<'a, Currency> {
        self.bundled.total()
    }

    /// Units of a cart line priced as part of a bundle and at standard price.
    pub fn allocated_quantities(&self, line_idx: usize) -> (u32, u32) {
        (
            self.bundled.quantity_of(line_idx),
            self.standard.quantity_of(line_idx),
        )
    }

    /// Savings on the bundled units, when the bundle is priced in the cart
    /// currency.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the bundle price is in another currency.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.bundled.total().sub(self.bundle_total)
    }
}
