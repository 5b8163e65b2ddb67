//! Bundle Allocation
//!
//! Splits the units of matched cart lines into a bundle-priced group and a
//! standard-priced group. Only whole bundles are formed; the units needed for
//! them are taken greedily from the earliest matched lines, so for the same
//! cart the same units always end up bundled.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    carts::{Cart, CartError},
    pricing::{TotalPriceError, line_total},
};

/// Errors that can occur while allocating quantities.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllocationError {
    /// A required quantity of zero cannot form bundles.
    #[error("required quantity must be at least 1")]
    ZeroRequiredQuantity,

    /// A matched line could not be read from the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped total calculation error.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Part of a cart line placed in one group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocatedLine<'a> {
    /// Index of the line in the cart
    pub line_idx: usize,

    /// Units of the line placed in this group
    pub quantity: u32,

    /// Original unit price of the line
    pub unit_price: Money<'a, Currency>,
}

/// Lines placed in one group, with their total at original prices.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocatedGroup<'a> {
    lines: SmallVec<[AllocatedLine<'a>; 10]>,
    total: Money<'a, Currency>,
}

impl<'a> AllocatedGroup<'a> {
    fn empty(currency: &'a Currency) -> Self {
        Self {
            lines: SmallVec::new(),
            total: Money::from_minor(0, currency),
        }
    }

    fn push(&mut self, line: AllocatedLine<'a>) -> Result<(), AllocationError> {
        self.total = self
            .total
            .add(line_total(line.unit_price, line.quantity)?)?;
        self.lines.push(line);

        Ok(())
    }

    /// Lines in the group, in cart order.
    pub fn lines(&self) -> &[AllocatedLine<'a>] {
        &self.lines
    }

    /// Units of a cart line held by this group.
    pub fn quantity_of(&self, line_idx: usize) -> u32 {
        self.lines
            .iter()
            .filter(|line| line.line_idx == line_idx)
            .map(|line| line.quantity)
            .sum()
    }

    /// Total units in the group.
    pub fn quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Value of the group at original unit prices.
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Number of lines in the group.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the group holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Result of splitting matched lines into bundles.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation<'a> {
    /// Units priced as part of a complete bundle
    pub bundled: AllocatedGroup<'a>,

    /// Units left at their standard price
    pub standard: AllocatedGroup<'a>,

    /// Number of complete bundles
    pub bundle_count: u64,

    /// `bundle_count` times the bundle unit price
    pub bundle_total: Money<'a, Currency>,
}

/// Allocate the units of `matched` lines into bundles of `required` units.
///
/// `matched` are cart line indexes in cart order.
///
/// # Errors
///
/// Returns an [`AllocationError`] if `required` is zero, a line index is not
/// in the cart, or a total overflows.
pub fn allocate<'a>(
    cart: &Cart<'a>,
    matched: &[usize],
    required: u32,
    bundle_price: Money<'a, Currency>,
) -> Result<Allocation<'a>, AllocationError> {
    if required == 0 {
        return Err(AllocationError::ZeroRequiredQuantity);
    }

    let lines = matched
        .iter()
        .map(|idx| cart.get_line(*idx).map(|line| (*idx, line)))
        .collect::<Result<SmallVec<[_; 10]>, _>>()?;

    let total: u64 = lines.iter().map(|(_, line)| u64::from(line.quantity())).sum();
    let bundle_count = total / u64::from(required);
    let mut budget = bundle_count * u64::from(required);

    let mut bundled = AllocatedGroup::empty(cart.currency());
    let mut standard = AllocatedGroup::empty(cart.currency());

    for (line_idx, line) in lines {
        let quantity = line.quantity();
        let to_bundle = u32::try_from(budget.min(u64::from(quantity))).unwrap_or(quantity);
        let to_standard = quantity - to_bundle;

        budget -= u64::from(to_bundle);

        if to_bundle > 0 {
            bundled.push(AllocatedLine {
                line_idx,
                quantity: to_bundle,
                unit_price: *line.unit_price(),
            })?;
        }

        if to_standard > 0 {
            standard.push(AllocatedLine {
                line_idx,
                quantity: to_standard,
                unit_price: *line.unit_price(),
            })?;
        }
    }

    let bundle_total = line_total(bundle_price, bundle_count)?;

    Ok(Allocation {
        bundled,
        standard,
        bundle_count,
        bundle_total,
    })
}
