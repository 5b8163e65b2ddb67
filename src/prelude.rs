//! Trellis prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    allocation::{AllocatedGroup, AllocatedLine, Allocation, AllocationError, allocate},
    carts::{Cart, CartError, CartLineItem},
    countries::{CountryKeys, CountryResolver},
    engine::{EligibilityEngine, OfferEvaluation, resolve_applicable_offers},
    exclusions::Exclusion,
    offers::{
        CountryPrice, Offer, OfferError, OfferKey, OfferKind, OfferMeta,
        applications::AppliedOffer,
        matcher::{MatchedLines, match_offer},
    },
    pricing::{PriceSource, ResolvedPrice, TotalPriceError, resolve_bundle_price},
    products::{Product, ProductKey},
    receipt::{Receipt, ReceiptError},
};
