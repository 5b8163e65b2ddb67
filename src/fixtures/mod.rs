//! Fixtures
//!
//! YAML fixture sets live under `./fixtures/<kind>/<name>.yml`, where `kind`
//! is one of `products`, `carts`, `offers` or `countries`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::SlotMap;
use thiserror::Error;
use tracing::warn;

use crate::{
    carts::{Cart, CartError, CartLineItem},
    countries::CountryResolver,
    fixtures::{carts::CartFixture, offers::OffersFixture, products::ProductsFixture},
    offers::{Offer, OfferKey, OfferMeta},
    products::{Product, ProductKey},
};

pub mod carts;
pub mod countries;
pub mod offers;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Offer not found
    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Cart construction error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// `SlotMaps` to store the actual types with generated keys
    product_meta: SlotMap<ProductKey, Product<'a>>,
    offer_meta: SlotMap<OfferKey, OfferMeta>,

    /// String key -> `SlotMap` key mappings for lookups
    product_keys: FxHashMap<String, ProductKey>,
    offer_keys: FxHashMap<String, OfferKey>,

    /// Cart lines, in cart order
    lines: Vec<CartLineItem<'a>>,

    /// Offer catalog, in catalog order
    offers: Vec<Offer<'a>>,

    /// Country code table, when one was loaded
    countries: Option<CountryResolver>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            product_meta: SlotMap::with_key(),
            offer_meta: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            offer_keys: FxHashMap::default(),
            lines: Vec::new(),
            offers: Vec::new(),
            countries: None,
            currency: None,
        }
    }

    fn read(&self, kind: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(kind).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(&self.read("products", name)?)?;

        for (key, product_fixture) in fixture.products {
            let (_minor_units, currency) = products::parse_price(&product_fixture.price)?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let product: Product<'a> = product_fixture.try_into()?;
            let product_key = self.product_meta.insert(product);

            self.product_keys.insert(key, product_key);
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        for line in fixture.lines {
            let product_key = self.product_key(&line.product)?;
            let line_item =
                CartLineItem::from_product(product_key, self.product(&line.product)?, line.quantity);

            self.lines.push(line_item);
        }

        Ok(self)
    }

    /// Load an offer catalog from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, if a price is
    /// malformed, or if an offer references an unknown product.
    pub fn load_offers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: OffersFixture = serde_norway::from_str(&self.read("offers", name)?)?;

        for offer_fixture in fixture.offers {
            let key = offer_fixture.key.clone();
            let offer_key = self.offer_meta.insert(OfferMeta::default());

            let (meta, offer) = match offer_fixture.try_into_offer(offer_key, &self.product_keys) {
                Ok(converted) => converted,
                Err(error) => {
                    self.offer_meta.remove(offer_key);

                    return Err(error);
                }
            };

            if let Some(meta_slot) = self.offer_meta.get_mut(offer_key) {
                *meta_slot = meta;
            }

            self.offers.push(offer);
            self.offer_keys.insert(key, offer_key);
        }

        Ok(self)
    }

    /// Load an offer catalog, treating a missing or invalid catalog as empty.
    ///
    /// Offers loaded before the failure are dropped along with the rest of
    /// the catalog. Keys from earlier catalogs are left as they were.
    pub fn load_offers_or_empty(&mut self, name: &str) -> &mut Self {
        let offers_before = self.offers.len();
        let offer_keys_before = self.offer_keys.clone();

        if let Err(error) = self.load_offers(name) {
            warn!(catalog = name, %error, "offer catalog unavailable, using an empty catalog");

            for offer in self.offers.drain(offers_before..) {
                self.offer_meta.remove(offer.key());
            }

            self.offer_keys = offer_keys_before;
        }

        self
    }

    /// Load a country code table from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_countries(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("countries")
            .join(format!("{name}.yml"));

        self.countries = Some(countries::load_country_table(file_path)?);

        Ok(self)
    }

    /// Load a complete fixture set (products, cart, and offers with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_offers(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product<'a>, FixtureError> {
        let product_key = self.product_key(key)?;

        self.product_meta
            .get(product_key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a product key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_key(&self, key: &str) -> Result<ProductKey, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get an offer by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not found.
    pub fn offer(&self, key: &str) -> Result<&Offer<'a>, FixtureError> {
        let offer_key = self.offer_key(key)?;

        self.offers
            .iter()
            .find(|offer| offer.key() == offer_key)
            .ok_or_else(|| FixtureError::OfferNotFound(key.to_string()))
    }

    /// Get an offer key by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not found.
    pub fn offer_key(&self, key: &str) -> Result<OfferKey, FixtureError> {
        self.offer_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::OfferNotFound(key.to_string()))
    }

    /// Get offer metadata by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the offer is not found.
    pub fn offer_meta(&self, key: &str) -> Result<&OfferMeta, FixtureError> {
        let offer_key = self.offer_key(key)?;

        self.offer_meta
            .get(offer_key)
            .ok_or_else(|| FixtureError::OfferNotFound(key.to_string()))
    }

    /// Get all cart lines
    pub fn lines(&self) -> &[CartLineItem<'a>] {
        &self.lines
    }

    /// Get all offers, in catalog order
    pub fn offers(&self) -> &[Offer<'a>] {
        &self.offers
    }

    /// Create a cart from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'a>, FixtureError> {
        let currency = self.currency()?;

        Ok(Cart::with_items(self.lines.clone(), currency)?)
    }

    /// The loaded country code table, or the built-in one.
    pub fn country_resolver(&self) -> CountryResolver {
        self.countries.clone().unwrap_or_default()
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Get the product metadata `SlotMap`
    pub fn product_meta_map(&self) -> &SlotMap<ProductKey, Product<'a>> {
        &self.product_meta
    }

    /// Get the offer metadata `SlotMap`
    pub fn offer_meta_map(&self) -> &SlotMap<OfferKey, OfferMeta> {
        &self.offer_meta
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
