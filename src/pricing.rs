//! Pricing
//!
//! Money helpers for line totals, and the bundle price resolver: given an
//! offer and the canonical keys for the shopper's country, decide what one
//! bundle costs, or that the offer is not sold in that market at all.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    countries::CountryKeys,
    exclusions::Exclusion,
    offers::{CountryPrice, Offer},
};

/// Errors that can occur while calculating totals.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TotalPriceError {
    /// Multiplying a unit price by a quantity overflowed.
    #[error("total of {quantity} x {minor_units} minor units overflows")]
    Overflow {
        /// Unit price in minor units
        minor_units: i64,

        /// Quantity being priced
        quantity: u64,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculates `unit_price * quantity`.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the total does not fit in minor units.
pub fn line_total<'a>(
    unit_price: Money<'a, Currency>,
    quantity: impl Into<u64>,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let quantity = quantity.into();
    let minor_units = unit_price.to_minor_units();

    i64::try_from(quantity)
        .ok()
        .and_then(|quantity| minor_units.checked_mul(quantity))
        .map(|total| Money::from_minor(total, unit_price.currency()))
        .ok_or(TotalPriceError::Overflow {
            minor_units,
            quantity,
        })
}

/// Which comparison produced the bundle price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// The offer has no country table; the flat default price applies.
    Default,

    /// An entry matched the hint exactly.
    ExactHint,

    /// An entry matched the name the hint code expands to.
    ExactExpansion,

    /// An entry and a key contain one another.
    Partial,
}

/// A resolved bundle unit price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPrice<'a> {
    /// Price of one complete bundle
    pub unit_price: Money<'a, Currency>,

    /// How the price was found
    pub source: PriceSource,
}

/// Resolve the per-bundle price of an offer for a country.
///
/// Tiers are tried in order and each scans the whole table before the next
/// one starts, so an exact match further down the table beats a partial match
/// near the top.
///
/// # Errors
///
/// Returns [`Exclusion::CountryNotListed`] when the offer has a country table
/// and no entry matches any tier.
pub fn resolve_bundle_price<'a>(
    offer: &Offer<'a>,
    keys: &CountryKeys,
) -> Result<ResolvedPrice<'a>, Exclusion> {
    let table = offer.country_prices();

    if table.is_empty() {
        return Ok(ResolvedPrice {
            unit_price: *offer.default_price(),
            source: PriceSource::Default,
        });
    }

    let entries: Vec<(String, &CountryPrice<'a>)> = table
        .iter()
        .map(|entry| (entry.normalized_country(), entry))
        .collect();

    let exact = |key: &str| {
        entries
            .iter()
            .find(|(name, _)| !key.is_empty() && name == key)
    };

    let found = exact(keys.literal())
        .map(|(_, entry)| (*entry, PriceSource::ExactHint))
        .or_else(|| {
            keys.expanded()
                .and_then(exact)
                .map(|(_, entry)| (*entry, PriceSource::ExactExpansion))
        })
        .or_else(|| {
            entries
                .iter()
                .find(|(name, _)| keys.iter().any(|key| partially_matches(name, key)))
                .map(|(_, entry)| (*entry, PriceSource::Partial))
        });

    match found {
        Some((entry, source)) => Ok(ResolvedPrice {
            unit_price: *entry.bundle_price(),
            source,
        }),
        None => Err(Exclusion::CountryNotListed(keys.literal().to_string())),
    }
}

/// Substring match in either direction. Empty values never match.
fn partially_matches(name: &str, key: &str) -> bool {
    if name.is_empty() || key.is_empty() {
        return false;
    }

    name.contains(key) || key.contains(name)
}
