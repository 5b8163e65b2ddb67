//! Offer Fixtures

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, products::parse_money},
    offers::{CountryPrice, Offer, OfferKey, OfferKind, OfferMeta},
    products::ProductKey,
};

/// Wrapper for an offer catalog in YAML. Catalog order is kept.
#[derive(Debug, Deserialize)]
pub struct OffersFixture {
    /// Offers, in catalog order
    pub offers: Vec<OfferFixture>,
}

/// Offer kind as written in YAML
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKindFixture {
    /// Flat-rate coupon
    Coupon,

    /// Fixed-price bundle
    Bundle,

    /// Merchandising carousel bundle
    Carousel,
}

impl From<OfferKindFixture> for OfferKind {
    fn from(kind: OfferKindFixture) -> Self {
        match kind {
            OfferKindFixture::Coupon => OfferKind::Coupon,
            OfferKindFixture::Bundle => OfferKind::Bundle,
            OfferKindFixture::Carousel => OfferKind::Carousel,
        }
    }
}

/// Offer Fixture
#[derive(Debug, Deserialize)]
pub struct OfferFixture {
    /// Fixture key of the offer
    pub key: String,

    /// Display name
    pub name: String,

    /// Offer kind
    pub kind: OfferKindFixture,

    /// Member product keys
    pub products: Vec<String>,

    /// Category filter
    #[serde(default)]
    pub category: Option<String>,

    /// Subcategory filter set
    #[serde(default)]
    pub subcategories: Vec<String>,

    /// Units per bundle
    #[serde(default = "default_required_quantity")]
    pub required_quantity: u32,

    /// Default bundle price (e.g., "25.00 GBP")
    pub price: String,

    /// Per-country bundle prices, in priority order
    #[serde(default)]
    pub country_prices: Vec<CountryPriceFixture>,
}

/// Country price entry as written in YAML
#[derive(Debug, Deserialize)]
pub struct CountryPriceFixture {
    /// Country name
    pub country: String,

    /// Bundle price in the country's currency (e.g., "500 INR")
    pub price: String,
}

fn default_required_quantity() -> u32 {
    1
}

impl OfferFixture {
    /// Convert the fixture into an offer with the given key, resolving member
    /// products through `product_keys`.
    ///
    /// # Errors
    ///
    /// Returns an error if a member product is unknown or a price cannot be
    /// parsed.
    pub fn try_into_offer<'a>(
        self,
        key: OfferKey,
        product_keys: &FxHashMap<String, ProductKey>,
    ) -> Result<(OfferMeta, Offer<'a>), FixtureError> {
        let members = self
            .products
            .iter()
            .map(|product| {
                product_keys
                    .get(product)
                    .copied()
                    .ok_or_else(|| FixtureError::ProductNotFound(product.clone()))
            })
            .collect::<Result<FxHashSet<ProductKey>, _>>()?;

        let mut offer = Offer::new(key, self.kind.into(), members, parse_money(&self.price)?)
            .with_required_quantity(self.required_quantity)
            .with_subcategories(self.subcategories);

        if let Some(category) = self.category {
            offer = offer.with_category(category);
        }

        for entry in self.country_prices {
            offer = offer.with_country_price(CountryPrice::new(
                entry.country,
                parse_money(&entry.price)?,
            ));
        }

        Ok((OfferMeta { name: self.name }, offer))
    }
}
