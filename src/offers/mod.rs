//! Offers

use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{countries::normalize, products::ProductKey};

pub mod applications;
pub mod matcher;

new_key_type! {
    /// Offer Key
    pub struct OfferKey;
}

/// Offer metadata
#[derive(Debug, Default, Clone)]
pub struct OfferMeta {
    /// Offer name
    pub name: String,
}

/// Errors for offers that cannot be evaluated as configured.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OfferError {
    /// The required bundle quantity must be at least one.
    #[error("required bundle quantity must be at least 1, got {0}")]
    InvalidRequiredQuantity(u32),

    /// A bundle price was negative.
    #[error("bundle price for {market} is negative ({minor_units} minor units)")]
    NegativePrice {
        /// Market the price belongs to (`default` for the flat price)
        market: String,

        /// Offending amount in minor units
        minor_units: i64,
    },
}

/// Offer kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferKind {
    /// Flat-rate coupon, priced outside the bundle engine.
    Coupon,

    /// Buy-N-for-a-fixed-price bundle, optionally filtered by category.
    Bundle,

    /// Bundle tied to a merchandising slot, matched by product membership only.
    Carousel,
}

/// A per-country bundle price override.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryPrice<'a> {
    country: String,
    bundle_price: Money<'a, Currency>,
}

impl<'a> CountryPrice<'a> {
    /// Create a new country price entry.
    pub fn new(country: impl Into<String>, bundle_price: Money<'a, Currency>) -> Self {
        Self {
            country: country.into(),
            bundle_price,
        }
    }

    /// Country name as configured.
    pub fn country(&self) -> &str {
        &self.country
    }

    /// Country name, normalized for comparison.
    pub fn normalized_country(&self) -> String {
        normalize(&self.country)
    }

    /// Price of one bundle in this market.
    pub fn bundle_price(&self) -> &Money<'a, Currency> {
        &self.bundle_price
    }

    /// ISO currency code of the bundle price.
    pub fn currency_code(&self) -> &'static str {
        self.bundle_price.currency().iso_alpha_code
    }
}

/// Bundle or carousel offer
#[derive(Debug, Clone)]
pub struct Offer<'a> {
    key: OfferKey,
    kind: OfferKind,
    category: Option<String>,
    subcategories: SmallVec<[String; 4]>,
    members: FxHashSet<ProductKey>,
    required_quantity: u32,
    default_price: Money<'a, Currency>,
    country_prices: SmallVec<[CountryPrice<'a>; 4]>,
}

impl<'a> Offer<'a> {
    /// Create a new offer over the given member products.
    ///
    /// The offer starts with a required quantity of 1, no category filters and
    /// an empty country price table.
    #[must_use]
    pub fn new(
        key: OfferKey,
        kind: OfferKind,
        members: impl IntoIterator<Item = ProductKey>,
        default_price: Money<'a, Currency>,
    ) -> Self {
        Self {
            key,
            kind,
            category: None,
            subcategories: SmallVec::new(),
            members: members.into_iter().collect(),
            required_quantity: 1,
            default_price,
            country_prices: SmallVec::new(),
        }
    }

    /// Set the required bundle quantity.
    #[must_use]
    pub fn with_required_quantity(mut self, quantity: u32) -> Self {
        self.required_quantity = quantity;
        self
    }

    /// Restrict the offer to a product category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict the offer to a set of product subcategories.
    #[must_use]
    pub fn with_subcategories<S: Into<String>>(
        mut self,
        subcategories: impl IntoIterator<Item = S>,
    ) -> Self {
        self.subcategories = subcategories.into_iter().map(Into::into).collect();
        self
    }

    /// Append a country price entry. Entry order is significant.
    #[must_use]
    pub fn with_country_price(mut self, price: CountryPrice<'a>) -> Self {
        self.country_prices.push(price);
        self
    }

    /// Offer key.
    pub fn key(&self) -> OfferKey {
        self.key
    }

    /// Offer kind.
    pub fn kind(&self) -> OfferKind {
        self.kind
    }

    /// Category filter, if any.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Subcategory filter set; empty when unfiltered.
    pub fn subcategories(&self) -> &[String] {
        &self.subcategories
    }

    /// Whether a product is a member of this offer.
    pub fn is_member(&self, product: ProductKey) -> bool {
        self.members.contains(&product)
    }

    /// Number of member products.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Units needed to form one bundle.
    pub fn required_quantity(&self) -> u32 {
        self.required_quantity
    }

    /// Flat bundle price used when no country table is configured.
    pub fn default_price(&self) -> &Money<'a, Currency> {
        &self.default_price
    }

    /// Country price table, in configured order.
    pub fn country_prices(&self) -> &[CountryPrice<'a>] {
        &self.country_prices
    }

    /// Check the offer is well-formed.
    ///
    /// # Errors
    ///
    /// - [`OfferError::InvalidRequiredQuantity`]: the required quantity is zero.
    /// - [`OfferError::NegativePrice`]: the default price or a country price is negative.
    pub fn validate(&self) -> Result<(), OfferError> {
        if self.required_quantity < 1 {
            return Err(OfferError::InvalidRequiredQuantity(self.required_quantity));
        }

        if self.default_price.is_negative() {
            return Err(OfferError::NegativePrice {
                market: "default".to_string(),
                minor_units: self.default_price.to_minor_units(),
            });
        }

        self.country_prices.iter().try_for_each(|entry| {
            if entry.bundle_price.is_negative() {
                Err(OfferError::NegativePrice {
                    market: entry.country.clone(),
                    minor_units: entry.bundle_price.to_minor_units(),
                })
            } else {
                Ok(())
            }
        })
    }
}
