//! Carts
//!
//! A cart is the read-only snapshot of what a shopper is about to buy: an
//! ordered list of line items, each pointing at a product and carrying the
//! quantity and the unit price captured when the item was added. Line order is
//! significant, as bundle allocation favours earlier lines.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    pricing::{TotalPriceError, line_total},
    products::{Product, ProductKey},
};

/// Errors related to cart construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line item has a zero quantity (index).
    #[error("Line {0} has a quantity of zero")]
    InvalidQuantity(usize),

    /// A line item's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line item has a negative unit price (index).
    #[error("Line {0} has a negative unit price")]
    NegativePrice(usize),

    /// A line item was not found in the cart.
    #[error("Line {0} not found")]
    LineNotFound(usize),
}

/// A single cart line, resolved with the product details the engine matches on.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem<'a> {
    product: ProductKey,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    category: String,
    subcategory: Option<String>,
}

impl<'a> CartLineItem<'a> {
    /// Create a line for a product, snapshotting its price and categories.
    pub fn from_product(key: ProductKey, product: &Product<'a>, quantity: u32) -> Self {
        Self {
            product: key,
            quantity,
            unit_price: product.price,
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
        }
    }

    /// Create a line from explicit values.
    pub fn new(
        product: ProductKey,
        quantity: u32,
        unit_price: Money<'a, Currency>,
        category: impl Into<String>,
        subcategory: Option<String>,
    ) -> Self {
        Self {
            product,
            quantity,
            unit_price,
            category: category.into(),
            subcategory,
        }
    }

    /// Returns the product of the line
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the quantity of the line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the unit price snapshot of the line
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the product category snapshot
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the product subcategory snapshot, if any
    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if a line has a zero quantity, a negative unit
    /// price, or a currency other than the cart currency.
    pub fn with_items(
        lines: impl Into<Vec<CartLineItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            if line.quantity == 0 {
                return Err(CartError::InvalidQuantity(i));
            }

            if line.unit_price.is_negative() {
                return Err(CartError::NegativePrice(i));
            }

            let line_currency = line.unit_price.currency();

            if line_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { lines, currency })
    }

    /// Calculate the subtotal of the cart at snapshot prices.
    ///
    /// # Errors
    ///
    /// Returns a `TotalPriceError` if there was a money arithmetic error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, TotalPriceError> {
        self.lines.iter().try_fold(
            Money::from_minor(0, self.currency),
            |acc, line| Ok(acc.add(line_total(line.unit_price, line.quantity)?)?),
        )
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CartError::LineNotFound` if the line is not found.
    pub fn get_line(&self, line: usize) -> Result<&CartLineItem<'a>, CartError> {
        self.lines.get(line).ok_or(CartError::LineNotFound(line))
    }

    /// Iterate over the lines in the cart, in cart order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem<'a>> {
        self.lines.iter()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
