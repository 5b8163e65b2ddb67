//! Exclusions
//!
//! Why an offer did not make it into the result list. Exclusions are designed
//! outcomes, not failures: the engine drops the offer and moves on, and the
//! reason is kept so callers and tests can see which stage rejected it.

use thiserror::Error;

use crate::{allocation::AllocationError, offers::OfferError};

/// Reason an offer was left out of the applied offers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Exclusion {
    /// The offer is malformed and was not evaluated.
    #[error("invalid offer: {0}")]
    InvalidOffer(#[from] OfferError),

    /// Coupons are priced by the flat-rate path, not the bundle engine.
    #[error("coupon offers are not bundle priced")]
    CouponOffer,

    /// No cart line is a member product of the offer.
    #[error("no cart line is a member of the offer")]
    NoMemberProducts,

    /// No member line is in the offer's category.
    #[error("no member line is in category {0:?}")]
    CategoryMismatch(String),

    /// No member line is in one of the offer's subcategories.
    #[error("no member line is in subcategories {0:?}")]
    SubcategoryMismatch(Vec<String>),

    /// Matched lines hold fewer units than one bundle needs.
    #[error("matched quantity {available} is below the required {required}")]
    BelowRequiredQuantity {
        /// Units needed for one bundle
        required: u32,

        /// Units held by the matched lines
        available: u64,
    },

    /// The offer has a country price table and the hint matches none of it.
    #[error("country {0:?} is not listed in the offer's price table")]
    CountryNotListed(String),

    /// Allocation produced no complete bundle.
    #[error("no complete bundle could be formed")]
    NoCompleteBundle,

    /// Bundle totals could not be computed.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}
